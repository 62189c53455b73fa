//! CRC-8 used by RMAP for both the header and the data checksum, as specified in
//! ECSS-E-ST-50-52C.
//!
//! The polynomial is x^8 + x^2 + x + 1 (0x07), processed least significant bit first, with a
//! zero seed and no final XOR.

/// Parameters of the RMAP CRC-8 for use with the [crc] crate.
pub const CRC_8_RMAP: crc::Algorithm<u8> = crc::Algorithm {
    width: 8,
    poly: 0x07,
    init: 0x00,
    refin: true,
    refout: true,
    xorout: 0x00,
    check: 0x20,
    residue: 0x00,
};

/// RMAP CRC-8 using [crc::Table<1>] as the CRC implementation.
pub const CRC_RMAP: crc::Crc<u8> = crc::Crc::<u8>::new(&CRC_8_RMAP);

/// RMAP CRC-8 using a [crc::NoTable] as the CRC implementation.
pub const CRC_RMAP_NO_TABLE: crc::Crc<u8, crc::NoTable> =
    crc::Crc::<u8, crc::NoTable>::new(&CRC_8_RMAP);

/// Calculate the RMAP CRC-8 over the passed bytes. The CRC of an empty slice is the seed, 0.
#[inline]
pub fn calculate_crc(bytes: &[u8]) -> u8 {
    CRC_RMAP.checksum(bytes)
}
