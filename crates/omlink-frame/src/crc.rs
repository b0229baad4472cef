/// CRC-8 generator polynomial (x^8 + x^2 + x + 1), MSB first, no reflection.
pub const POLYNOMIAL: u8 = 0x07;

/// Fold `data` into a running CRC-8 starting from `initial`.
///
/// Passing the result of one call as `initial` to the next is the same as
/// checksumming the concatenation, so header and payload can be hashed
/// separately:
///
/// ```
/// use omlink_frame::crc8;
///
/// let header = [0xAA, 0x55, 0x05];
/// let payload = [0x01, 0x02, 0x03, 0x04];
/// let whole = [0xAA, 0x55, 0x05, 0x01, 0x02, 0x03, 0x04];
/// assert_eq!(crc8(crc8(0, &header), &payload), crc8(0, &whole));
/// ```
pub fn crc8(initial: u8, data: &[u8]) -> u8 {
    let mut crc = initial;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ POLYNOMIAL;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}
