//! Core type definitions for tierio
//!
//! The storage node descriptor travels with every block location the
//! naming service hands out. Wire layout (big-endian, 20 bytes):
//!
//! ```text
//! +--------+--------+--------+--------+--------+
//! | type   | class  | loc    | ipv4   | port   |
//! | 4      | 4      | 4      | 4      | 4      |
//! +--------+--------+--------+--------+--------+
//! ```

use crate::error::{Error, Result};
use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::OnceLock;

/// Descriptor for a single storage node
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DataNodeInfo {
    storage_type: i32,
    storage_class: i32,
    location_class: i32,
    ip_address: [u8; 4],
    port: u32,
    #[serde(skip)]
    key: OnceLock<u64>,
}

impl DataNodeInfo {
    /// Encoded size of a descriptor in bytes
    pub const CSIZE: usize = 20;

    /// Create a descriptor from explicit field values
    #[must_use]
    pub fn new(
        storage_type: i32,
        storage_class: i32,
        location_class: i32,
        ip_address: [u8; 4],
        port: u32,
    ) -> Self {
        Self {
            storage_type,
            storage_class,
            location_class,
            ip_address,
            port,
            key: OnceLock::new(),
        }
    }

    /// Parse a descriptor from the front of `buf`
    pub fn from_buf(buf: &mut impl Buf) -> Result<Self> {
        let mut info = Self::default();
        info.decode(buf)?;
        Ok(info)
    }

    /// Append the wire record to `buf`, returning the bytes written
    pub fn encode(&self, buf: &mut impl BufMut) -> usize {
        buf.put_i32(self.storage_type);
        buf.put_i32(self.storage_class);
        buf.put_i32(self.location_class);
        buf.put_slice(&self.ip_address);
        buf.put_u32(self.port);
        Self::CSIZE
    }

    /// Overwrite all wire fields from `buf`
    ///
    /// The cached identity key is left alone. A decode that moves this
    /// descriptor to a different endpoint should go through [`refresh`]
    /// instead, or the key will be stale.
    ///
    /// [`refresh`]: Self::refresh
    pub fn decode(&mut self, buf: &mut impl Buf) -> Result<()> {
        if buf.remaining() < Self::CSIZE {
            return Err(Error::Deserialization(format!(
                "data node record needs {} bytes, have {}",
                Self::CSIZE,
                buf.remaining()
            )));
        }

        self.storage_type = buf.get_i32();
        self.storage_class = buf.get_i32();
        self.location_class = buf.get_i32();
        buf.copy_to_slice(&mut self.ip_address);
        self.port = buf.get_u32();
        Ok(())
    }

    /// Replace every field with those of a newer descriptor
    pub fn refresh(&mut self, other: &Self) {
        self.storage_type = other.storage_type;
        self.storage_class = other.storage_class;
        self.location_class = other.location_class;
        self.ip_address = other.ip_address;
        self.port = other.port;
        self.key = OnceLock::new();
    }

    /// Identity key of the physical endpoint (address + port)
    pub fn key(&self) -> u64 {
        *self
            .key
            .get_or_init(|| Self::calc_key(&self.ip_address, self.port))
    }

    /// Derive the identity key for an address and port
    #[must_use]
    pub fn calc_key(ip_address: &[u8], port: u32) -> u64 {
        (u64::from(hash32(ip_address)) << 32) | u64::from(port)
    }

    /// Storage kind code
    #[must_use]
    pub const fn storage_type(&self) -> i32 {
        self.storage_type
    }

    /// Storage class code
    #[must_use]
    pub const fn storage_class(&self) -> i32 {
        self.storage_class
    }

    /// Location class code
    #[must_use]
    pub const fn location_class(&self) -> i32 {
        self.location_class
    }

    /// Raw IPv4 address bytes
    #[must_use]
    pub const fn ip_address(&self) -> &[u8; 4] {
        &self.ip_address
    }

    /// Service port
    #[must_use]
    pub const fn port(&self) -> u32 {
        self.port
    }

    /// Network endpoint of the node, if the port fits in 16 bits
    #[must_use]
    pub fn socket_addr(&self) -> Option<SocketAddrV4> {
        let port = u16::try_from(self.port).ok()?;
        Some(SocketAddrV4::new(Ipv4Addr::from(self.ip_address), port))
    }
}

/// 32-bit array hash over signed bytes (seed 1, multiplier 31)
#[must_use]
pub fn hash32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(1i32, |acc, &b| {
        #[allow(clippy::cast_possible_wrap)]
        let b = b as i8;
        acc.wrapping_mul(31).wrapping_add(i32::from(b))
    }) as u32
}

impl PartialEq for DataNodeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.storage_type == other.storage_type
            && self.storage_class == other.storage_class
            && self.location_class == other.location_class
            && self.ip_address == other.ip_address
            && self.port == other.port
    }
}

impl Eq for DataNodeInfo {}

impl fmt::Display for DataNodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DataNodeInfo [storageType={}, storageClass={}, locationClass={}, ipAddress={}, port={}, key={}]",
            self.storage_type,
            self.storage_class,
            self.location_class,
            Ipv4Addr::from(self.ip_address),
            self.port,
            self.key.get().copied().unwrap_or_default()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use rand::Rng;

    fn sample() -> DataNodeInfo {
        DataNodeInfo::new(1, 2, 3, [10, 0, 0, 1], 8080)
    }

    #[test]
    fn test_encode_layout() {
        let mut buf = BytesMut::new();
        assert_eq!(sample().encode(&mut buf), DataNodeInfo::CSIZE);
        assert_eq!(buf.len(), DataNodeInfo::CSIZE);
        assert_eq!(
            &buf[..],
            &[0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 10, 0, 0, 1, 0, 0, 0x1f, 0x90]
        );
    }

    #[test]
    fn test_round_trip_random() {
        let mut rng = rand::thread_rng();
        for _ in 0..64 {
            let info = DataNodeInfo::new(rng.r#gen(), rng.r#gen(), rng.r#gen(), rng.r#gen(), rng.r#gen());
            let mut buf = BytesMut::new();
            info.encode(&mut buf);

            let decoded = DataNodeInfo::from_buf(&mut buf.freeze()).unwrap();
            assert_eq!(decoded, info);
            assert_eq!(decoded.ip_address(), info.ip_address());
            assert_eq!(decoded.port(), info.port());
        }
    }

    #[test]
    fn test_decode_short_buffer() {
        let mut info = sample();
        let mut short: &[u8] = &[0u8; 19];
        assert!(matches!(info.decode(&mut short), Err(Error::Deserialization(_))));
        assert_eq!(info, sample());
    }

    #[test]
    fn test_decode_overwrites_fields() {
        let mut buf = BytesMut::new();
        DataNodeInfo::new(7, 8, 9, [192, 168, 1, 20], 50020).encode(&mut buf);

        let mut info = sample();
        info.decode(&mut buf).unwrap();
        assert_eq!(info.storage_type(), 7);
        assert_eq!(info.storage_class(), 8);
        assert_eq!(info.location_class(), 9);
        assert_eq!(info.ip_address(), &[192, 168, 1, 20]);
        assert_eq!(info.port(), 50020);
    }

    #[test]
    fn test_hash32_matches_array_hash() {
        assert_eq!(hash32(&[]), 1);
        assert_eq!(hash32(&[10, 0, 0, 1]), 1_221_432);
        // high bytes hash as negative values
        assert_eq!(hash32(&[192, 168, 1, 20]), 0xffef_b59c);
    }

    #[test]
    fn test_key_known_values() {
        assert_eq!(sample().key(), 5_246_010_494_295_952);
        assert_eq!(
            DataNodeInfo::calc_key(&[192, 168, 1, 20], 50020),
            18_442_158_680_725_046_116
        );
    }

    #[test]
    fn test_key_ignores_tier_fields() {
        let a = DataNodeInfo::new(0, 0, 0, [10, 0, 0, 1], 8080);
        let b = DataNodeInfo::new(4, 5, 6, [10, 0, 0, 1], 8080);
        assert_ne!(a, b);
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key(), a.key());

        let c = DataNodeInfo::new(0, 0, 0, [10, 0, 0, 1], 8081);
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn test_refresh_invalidates_key() {
        let mut info = sample();
        let old_key = info.key();

        let newer = DataNodeInfo::new(1, 2, 3, [10, 0, 0, 2], 8080);
        info.refresh(&newer);
        assert_eq!(info, newer);
        assert_ne!(info.key(), old_key);
        assert_eq!(info.key(), newer.key());
    }

    #[test]
    fn test_decode_keeps_cached_key() {
        let mut info = sample();
        let key = info.key();

        let mut buf = BytesMut::new();
        DataNodeInfo::new(9, 9, 9, [10, 0, 0, 1], 8080).encode(&mut buf);
        info.decode(&mut buf).unwrap();
        assert_eq!(info.key(), key);
    }

    #[test]
    fn test_display_does_not_fill_key_cache() {
        let mut info = sample();
        assert!(info.to_string().ends_with("port=8080, key=0]"));

        let mut buf = BytesMut::new();
        DataNodeInfo::new(1, 2, 3, [192, 168, 1, 20], 50020).encode(&mut buf);
        info.decode(&mut buf).unwrap();
        assert_eq!(
            info.key(),
            DataNodeInfo::calc_key(&[192, 168, 1, 20], 50020)
        );
        assert!(info.to_string().contains(&format!("key={}]", info.key())));
    }

    #[test]
    fn test_socket_addr() {
        assert_eq!(
            sample().socket_addr(),
            Some("10.0.0.1:8080".parse().unwrap())
        );
        assert_eq!(DataNodeInfo::new(0, 0, 0, [1, 2, 3, 4], 70_000).socket_addr(), None);
    }

    #[test]
    fn test_default_is_zeroed() {
        let info = DataNodeInfo::default();
        assert_eq!(info.ip_address(), &[0; 4]);
        assert_eq!(info.port(), 0);
        assert_eq!(info.storage_type(), 0);
    }
}
