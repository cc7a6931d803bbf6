use std::io::{self, Write};

/// Status written for every request, whatever dispatch did.
pub const ACK_STATUS: u16 = 200;

/// Write the unconditional acknowledgement: `200 OK` with an empty body.
///
/// `keep_alive` false adds `Connection: close`; the caller closes the connection
/// afterwards.
///
/// # Errors
///
/// Returns an error if the peer can no longer be written to.
pub fn write_ack<W: Write>(out: &mut W, keep_alive: bool) -> io::Result<()> {
    let connection = if keep_alive { "" } else { "Connection: close\r\n" };
    let ack = format!(
        "HTTP/1.1 {ACK_STATUS} OK\r\nContent-Type: text/plain\r\nContent-Length: 0\r\n{connection}\r\n"
    );
    out.write_all(ack.as_bytes())?;
    out.flush()
}
