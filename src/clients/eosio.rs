//! EOSIO transaction types and their binary packing.
//!
//! Only what submitting a transaction needs: account/action names, varuint32
//! lengths, the transaction header with its TaPoS reference, and actions whose
//! data has already been encoded by the node's ABI serializer.

use chrono::{DateTime, Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{HemertonError, Result};

const NAME_CHARS: &str = ".12345abcdefghijklmnopqrstuvwxyz";
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn symbol(c: char) -> Option<u64> {
    NAME_CHARS.find(c).map(|i| i as u64)
}

/// Whether `s` is a valid account, table or action name.
pub fn is_valid_name(s: &str) -> bool {
    let len = s.chars().count();
    if len == 0 || len > 13 || s.ends_with('.') {
        return false;
    }
    s.chars().enumerate().all(|(i, c)| match symbol(c) {
        // The 13th character only has 4 bits.
        Some(v) if i == 12 => v < 16,
        Some(_) => true,
        None => false,
    })
}

/// Encodes a name into its 64-bit form.
pub fn name_to_u64(s: &str) -> Result<u64> {
    if !is_valid_name(s) {
        return Err(HemertonError::Serialization {
            message: format!("'{}' is not a valid name", s),
        });
    }
    let mut value: u64 = 0;
    for (i, c) in s.chars().enumerate() {
        let v = symbol(c).unwrap_or(0);
        if i < 12 {
            value |= (v & 0x1f) << (64 - 5 * (i + 1));
        } else {
            value |= v & 0x0f;
        }
    }
    Ok(value)
}

/// Appends `n` as a LEB128 varuint32.
pub fn push_varuint32(buf: &mut Vec<u8>, mut n: u32) {
    loop {
        let byte = (n & 0x7f) as u8;
        n >>= 7;
        if n == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

fn push_name(buf: &mut Vec<u8>, name: &str) -> Result<()> {
    buf.extend_from_slice(&name_to_u64(name)?.to_le_bytes());
    Ok(())
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionLevel {
    pub actor: String,
    pub permission: String,
}

/// A contract action with ABI-encoded data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub account: String,
    pub name: String,
    pub authorization: Vec<PermissionLevel>,
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
}

impl Action {
    fn pack_into(&self, buf: &mut Vec<u8>) -> Result<()> {
        push_name(buf, &self.account)?;
        push_name(buf, &self.name)?;
        push_varuint32(buf, self.authorization.len() as u32);
        for auth in &self.authorization {
            push_name(buf, &auth.actor)?;
            push_name(buf, &auth.permission)?;
        }
        push_varuint32(buf, self.data.len() as u32);
        buf.extend_from_slice(&self.data);
        Ok(())
    }
}

/// Reference block a transaction is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tapos {
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
}

impl Tapos {
    /// Derives the reference from a block number and its 32-byte id in hex.
    pub fn from_block(block_num: u32, block_id: &str) -> Result<Self> {
        let id = hex::decode(block_id).map_err(|e| HemertonError::Serialization {
            message: format!("invalid block id '{}': {}", block_id, e),
        })?;
        let prefix: [u8; 4] = id
            .get(8..12)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| HemertonError::Serialization {
                message: format!("block id '{}' is too short", block_id),
            })?;
        Ok(Self {
            ref_block_num: (block_num & 0xffff) as u16,
            ref_block_prefix: u32::from_le_bytes(prefix),
        })
    }
}

/// Unsigned transaction in the JSON shape the wallet signs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub expiration: String,
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
    pub max_net_usage_words: u32,
    pub max_cpu_usage_ms: u8,
    pub delay_sec: u32,
    pub context_free_actions: Vec<Action>,
    pub actions: Vec<Action>,
    pub transaction_extensions: Vec<serde_json::Value>,
}

impl Transaction {
    /// Builds a transaction expiring `expire_in_secs` after `head_block_time`.
    pub fn new(
        actions: Vec<Action>,
        tapos: Tapos,
        head_block_time: &str,
        expire_in_secs: u32,
    ) -> Result<Self> {
        let head = parse_block_time(head_block_time)?;
        let expiration = head + Duration::seconds(i64::from(expire_in_secs));
        Ok(Self {
            expiration: expiration.format(TIME_FORMAT).to_string(),
            ref_block_num: tapos.ref_block_num,
            ref_block_prefix: tapos.ref_block_prefix,
            max_net_usage_words: 0,
            max_cpu_usage_ms: 0,
            delay_sec: 0,
            context_free_actions: Vec::new(),
            actions,
            transaction_extensions: Vec::new(),
        })
    }

    /// Serializes the transaction in its binary layout.
    pub fn pack(&self) -> Result<Vec<u8>> {
        let expiration = parse_block_time(&self.expiration)?;
        let secs = u32::try_from(expiration.and_utc().timestamp()).map_err(|_| {
            HemertonError::Serialization {
                message: format!("expiration '{}' out of range", self.expiration),
            }
        })?;

        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(&secs.to_le_bytes());
        buf.extend_from_slice(&self.ref_block_num.to_le_bytes());
        buf.extend_from_slice(&self.ref_block_prefix.to_le_bytes());
        push_varuint32(&mut buf, self.max_net_usage_words);
        buf.push(self.max_cpu_usage_ms);
        push_varuint32(&mut buf, self.delay_sec);

        push_varuint32(&mut buf, self.context_free_actions.len() as u32);
        for action in &self.context_free_actions {
            action.pack_into(&mut buf)?;
        }
        push_varuint32(&mut buf, self.actions.len() as u32);
        for action in &self.actions {
            action.pack_into(&mut buf)?;
        }
        // Extensions are never set by this client.
        push_varuint32(&mut buf, 0);
        Ok(buf)
    }

    /// Transaction id: SHA-256 of the packed bytes, in hex.
    pub fn id(&self) -> Result<String> {
        Ok(hex::encode(Sha256::digest(self.pack()?)))
    }
}

/// Parses a node timestamp such as `2024-05-01T12:00:00.500`.
pub fn parse_block_time(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.naive_utc()))
        .map_err(|e| HemertonError::Serialization {
            message: format!("invalid block time '{}': {}", s, e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_encoding() {
        assert_eq!(name_to_u64("eosio").unwrap(), 6138663577826885632);
        assert_eq!(name_to_u64("active").unwrap(), 3617214756542218240);
        assert!(name_to_u64("Upper").is_err());
    }

    #[test]
    fn test_name_validation() {
        assert!(is_valid_name("hemerton"));
        assert!(is_valid_name("newlist"));
        assert!(is_valid_name("a.b"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("trailing."));
        assert!(!is_valid_name("six6"));
        assert!(!is_valid_name("abcdefghijklmn"));
        // 13th character limited to .1-5a-j
        assert!(is_valid_name("abcdefghijklj"));
        assert!(!is_valid_name("abcdefghijklz"));
    }

    #[test]
    fn test_varuint32() {
        let mut buf = Vec::new();
        push_varuint32(&mut buf, 0);
        push_varuint32(&mut buf, 127);
        push_varuint32(&mut buf, 128);
        push_varuint32(&mut buf, 300);
        assert_eq!(buf, vec![0x00, 0x7f, 0x80, 0x01, 0xac, 0x02]);
    }

    #[test]
    fn test_tapos_from_block() {
        let id = "0000000a0000000011223344000000000000000000000000000000000000000000";
        let tapos = Tapos::from_block(0x1_000a, &id[..64]).unwrap();
        assert_eq!(tapos.ref_block_num, 0x000a);
        assert_eq!(tapos.ref_block_prefix, 0x4433_2211);
        assert!(Tapos::from_block(1, "00ff").is_err());
    }

    #[test]
    fn test_transaction_expiration_and_layout() {
        let action = Action {
            account: "hemerton".into(),
            name: "upload".into(),
            authorization: vec![PermissionLevel {
                actor: "eosio".into(),
                permission: "owner".into(),
            }],
            data: vec![0xaa, 0xbb],
        };
        let tapos = Tapos {
            ref_block_num: 1,
            ref_block_prefix: 2,
        };
        let trx = Transaction::new(vec![action], tapos, "2024-05-01T12:00:00.500", 30).unwrap();
        assert_eq!(trx.expiration, "2024-05-01T12:00:30");

        let packed = trx.pack().unwrap();
        // header (4 + 2 + 4 + 1 + 1 + 1) + cfa count + action count
        assert_eq!(packed[13], 0);
        assert_eq!(packed[14], 1);
        // account + name + auth count + auth + data len + data + extensions
        assert_eq!(packed.len(), 15 + 8 + 8 + 1 + 16 + 1 + 2 + 1);
        assert_eq!(&packed[packed.len() - 3..], &[0xaa, 0xbb, 0x00]);
        assert_eq!(trx.id().unwrap().len(), 64);
    }

    #[test]
    fn test_action_data_serializes_as_hex() {
        let action = Action {
            account: "hemerton".into(),
            name: "open".into(),
            authorization: vec![],
            data: vec![0x01, 0xff],
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["data"], "01ff");
        let back: Action = serde_json::from_value(json).unwrap();
        assert_eq!(back, action);
    }
}
