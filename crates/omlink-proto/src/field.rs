use crate::error::DecodeError;
use crate::node_id::NodeId;

/// Bounds-checked little-endian field reader over a message payload.
///
/// The reader starts just after the id byte. Every accessor checks the
/// remaining length first and reports [`DecodeError::Truncated`] with the
/// total size the layout needed, so decoders never index past the payload.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    id: u8,
    payload: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    /// Reader over `payload`, positioned after its id byte.
    ///
    /// Fails with [`DecodeError::Empty`] when there is no id byte.
    pub fn new(payload: &'a [u8]) -> Result<Self, DecodeError> {
        let id = *payload.first().ok_or(DecodeError::Empty)?;
        Ok(Self {
            id,
            payload,
            pos: 1,
        })
    }

    /// The message id byte.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.payload.len() - self.pos
    }

    /// Fail unless at least `total` bytes (id included) are present.
    pub fn require(&self, total: usize) -> Result<(), DecodeError> {
        if self.payload.len() < total {
            return Err(self.truncated(total));
        }
        Ok(())
    }

    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos + n;
        let slice = self
            .payload
            .get(self.pos..end)
            .ok_or_else(|| self.truncated(end))?;
        self.pos = end;
        Ok(slice)
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.array::<1>()?[0])
    }

    pub fn i8(&mut self) -> Result<i8, DecodeError> {
        Ok(self.u8()? as i8)
    }

    pub fn u16_le(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    pub fn u32_le(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub fn node_id(&mut self) -> Result<NodeId, DecodeError> {
        Ok(NodeId::from_bytes(self.array()?))
    }

    fn truncated(&self, needed: usize) -> DecodeError {
        DecodeError::Truncated {
            id: self.id,
            needed,
            got: self.payload.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_fields_in_order() {
        let payload = [0x96, 0x01, 0xFE, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0x03, 0x02, 0x01];
        let mut r = FieldReader::new(&payload).unwrap();

        assert_eq!(r.id(), 0x96);
        assert_eq!(r.u8().unwrap(), 0x01);
        assert_eq!(r.i8().unwrap(), -2);
        assert_eq!(r.u16_le().unwrap(), 0x1234);
        assert_eq!(r.u32_le().unwrap(), 0x1234_5678);
        assert_eq!(r.node_id().unwrap().get(), 0x01_0203);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn empty_payload_rejected() {
        assert_eq!(FieldReader::new(&[]).unwrap_err(), DecodeError::Empty);
    }

    #[test]
    fn short_read_reports_needed_total() {
        let payload = [0x8F, 0x01, 0x02];
        let mut r = FieldReader::new(&payload).unwrap();
        let err = r.node_id().unwrap_err();
        assert_eq!(
            err,
            DecodeError::Truncated {
                id: 0x8F,
                needed: 4,
                got: 3
            }
        );
        // failed read consumes nothing
        assert_eq!(r.remaining(), 2);
    }

    #[test]
    fn require_checks_total_length() {
        let r = FieldReader::new(&[0x80, 0x00]).unwrap();
        assert!(r.require(2).is_ok());
        assert!(matches!(
            r.require(3),
            Err(DecodeError::Truncated { needed: 3, got: 2, .. })
        ));
    }

    #[test]
    fn bytes_slice_borrowed_from_payload() {
        let payload = [0x0C, b'h', b'i'];
        let mut r = FieldReader::new(&payload).unwrap();
        assert_eq!(r.bytes(2).unwrap(), b"hi");
        assert!(r.bytes(1).is_err());
    }
}
