//! Fixed-layout binary codec for a single treasure record.
//!
//! Every record occupies exactly [`RECORD_WIDTH`] bytes on disk: a u32 id,
//! a NUL-padded user name, two f32 coordinates, a NUL-padded clue and an
//! i32 value, all little-endian. A record file is a plain concatenation of
//! these blocks with no header or footer.

use crate::error::HuntError;

pub const USER_LEN: usize = 50;
pub const CLUE_LEN: usize = 200;

/// Byte width of one encoded record.
pub const RECORD_WIDTH: usize = 4 + USER_LEN + 4 + 4 + CLUE_LEN + 4;

/// User-supplied fields of a treasure; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct TreasureFields {
    pub user: String,
    pub latitude: f32,
    pub longitude: f32,
    pub clue: String,
    pub value: i32,
}

/// One stored treasure record.
#[derive(Debug, Clone, PartialEq)]
pub struct Treasure {
    pub id: u32,
    pub user: String,
    pub latitude: f32,
    pub longitude: f32,
    pub clue: String,
    pub value: i32,
}

impl Treasure {
    pub fn new(id: u32, fields: TreasureFields) -> Self {
        Self {
            id,
            user: fields.user,
            latitude: fields.latitude,
            longitude: fields.longitude,
            clue: fields.clue,
            value: fields.value,
        }
    }

    /// Renumber a record, keeping all other fields. Used by compaction.
    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    pub fn encode(&self) -> [u8; RECORD_WIDTH] {
        let mut block = [0u8; RECORD_WIDTH];
        block[0..4].copy_from_slice(&self.id.to_le_bytes());
        pack_str(&mut block[4..4 + USER_LEN], &self.user);
        let mut off = 4 + USER_LEN;
        block[off..off + 4].copy_from_slice(&self.latitude.to_le_bytes());
        off += 4;
        block[off..off + 4].copy_from_slice(&self.longitude.to_le_bytes());
        off += 4;
        pack_str(&mut block[off..off + CLUE_LEN], &self.clue);
        off += CLUE_LEN;
        block[off..off + 4].copy_from_slice(&self.value.to_le_bytes());
        block
    }

    pub fn decode(block: &[u8]) -> Result<Self, HuntError> {
        if block.len() != RECORD_WIDTH {
            return Err(HuntError::CorruptRecord(block.len()));
        }
        let id = u32::from_le_bytes(block[0..4].try_into().unwrap());
        let user = unpack_str(&block[4..4 + USER_LEN]);
        let mut off = 4 + USER_LEN;
        let latitude = f32::from_le_bytes(block[off..off + 4].try_into().unwrap());
        off += 4;
        let longitude = f32::from_le_bytes(block[off..off + 4].try_into().unwrap());
        off += 4;
        let clue = unpack_str(&block[off..off + CLUE_LEN]);
        off += CLUE_LEN;
        let value = i32::from_le_bytes(block[off..off + 4].try_into().unwrap());
        Ok(Self {
            id,
            user,
            latitude,
            longitude,
            clue,
            value,
        })
    }
}

/// Copy `s` into `dst`, truncating at a character boundary; the rest stays NUL.
fn pack_str(dst: &mut [u8], s: &str) {
    let mut end = 0;
    for (idx, ch) in s.char_indices() {
        if idx + ch.len_utf8() > dst.len() {
            break;
        }
        end = idx + ch.len_utf8();
    }
    dst[..end].copy_from_slice(&s.as_bytes()[..end]);
}

fn unpack_str(src: &[u8]) -> String {
    let end = src.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
    String::from_utf8_lossy(&src[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Treasure {
        Treasure {
            id: 3,
            user: "al".into(),
            latitude: 45.5,
            longitude: -122.25,
            clue: "under the old oak".into(),
            value: 42,
        }
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let t = sample();
        let block = t.encode();
        assert_eq!(block.len(), RECORD_WIDTH);
        let decoded = Treasure::decode(&block).unwrap();
        assert_eq!(decoded, t);
    }

    #[test]
    fn test_short_block_is_corrupt() {
        let block = sample().encode();
        let err = Treasure::decode(&block[..RECORD_WIDTH - 1]).unwrap_err();
        assert!(matches!(err, HuntError::CorruptRecord(len) if len == RECORD_WIDTH - 1));
    }

    #[test]
    fn test_over_long_fields_truncate_at_char_boundary() {
        let mut t = sample();
        t.user = "x".repeat(USER_LEN + 10);
        t.clue = format!("{}é", "y".repeat(CLUE_LEN - 1)); // é would straddle the boundary
        let decoded = Treasure::decode(&t.encode()).unwrap();
        assert_eq!(decoded.user.len(), USER_LEN);
        assert_eq!(decoded.clue, "y".repeat(CLUE_LEN - 1));
    }

    #[test]
    fn test_negative_value_and_empty_strings() {
        let t = Treasure {
            id: 1,
            user: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            clue: String::new(),
            value: -7,
        };
        let decoded = Treasure::decode(&t.encode()).unwrap();
        assert_eq!(decoded, t);
    }
}
