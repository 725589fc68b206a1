// SPDX-License-Identifier: MPL-2.0
//! Logger setup for the binary.

use std::io::{self, Write};

/// Warnings from everything, plus our own startup summary at `info`.
/// `RUST_LOG` overrides it.
pub const DEFAULT_FILTER: &str = "warn,fbplay=info";

pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_FILTER))
        .format(|buf, record| write_record(buf, record))
        .init();
}

/// Writes one log line. The terminal is raw while playing, so lines end in
/// `\r\n` to return the cursor to column 0.
pub fn write_record<W: Write + ?Sized>(out: &mut W, record: &log::Record<'_>) -> io::Result<()> {
    write!(
        out,
        "[{} {}] {}\r\n",
        record.level(),
        record.target(),
        record.args()
    )
}
