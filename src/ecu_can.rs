//! Contains structs for the PE3 ECU CAN packages
//!
//! PE3 CAN Protocol (AN400): [http://pe-ltd.com/assets/AN400_CAN_Protocol_C.pdf](http://pe-ltd.com/assets/AN400_CAN_Protocol_C.pdf)
//!
//! ### CAN Package Information
//! The ECU broadcasts on 29 bit extended IDs at 250 kbit/s. Every field is a
//! little-endian 16 bit integer. A CAN package is setup like this:
//! ```ignore
//! #[derive(bincode::Decode, PartialEq, Clone, Copy, Debug, Default)]
//! pub struct PePackName {
//!     // Package Data, in wire order
//! }
//! impl EcuPack for PePackName {
//!     const ID: u32 = CAN_ID;      // the extended ID of the package
//!     const MIN_BYTES: usize = 2;  // bytes this firmware reads from the payload
//! }
//! ```
//! `#[derive(bincode::Decode)]` makes the package able to be decoded from bytes.
//!
//! Only the leading fields this firmware uses are declared. Trailing bytes of a
//! frame are left undecoded.

use bincode::config::{Configuration, Fixint, LittleEndian, NoLimit};

/// Bincode settings matching the PE3 wire format: little-endian, fixed width integers.
pub const PE3_BINCODE_CONFIG: Configuration<LittleEndian, Fixint, NoLimit> =
    bincode::config::standard()
        .with_little_endian()
        .with_fixed_int_encoding();

/// Prerequisite trait for PE3 packages
///
/// Sets the ID and the number of bytes a payload needs before the package can be decoded.
/// Associated constants do not increase the size of a struct's memory.
pub trait EcuPack: bincode::Decode<()> + Copy {
    /// 29 bit extended ID
    const ID: u32;
    /// Minimum payload length in bytes
    const MIN_BYTES: usize;
}

/// PE1: engine speed and throttle position.
///
/// Further fields of PE1 (fuel open time, ignition angle) are not used.
#[derive(bincode::Decode, PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct Pe1Pack {
    /// 1 rpm/bit
    pub rpm: u16,
    /// 0.1 %/bit
    pub tps: u16,
}
impl EcuPack for Pe1Pack {
    const ID: u32 = 0x0CFF_F048;
    const MIN_BYTES: usize = 4;
}

/// PE6: battery voltage, air temperature and coolant temperature.
///
/// Only the battery voltage is used.
#[derive(bincode::Decode, PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct Pe6Pack {
    /// 0.01 V/bit
    pub battery_volt: u16,
}
impl EcuPack for Pe6Pack {
    const ID: u32 = 0x0CFF_F548;
    const MIN_BYTES: usize = 2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_pe3_protocol() {
        assert_eq!(Pe1Pack::ID, 218_099_784);
        assert_eq!(Pe6Pack::ID, 218_101_064);
    }

    #[test]
    fn pe1_is_little_endian() {
        let bytes = [0x1C, 0x25, 0xFA, 0x00];
        let (pack, read): (Pe1Pack, usize) =
            bincode::decode_from_slice(&bytes, PE3_BINCODE_CONFIG).unwrap();
        assert_eq!(read, Pe1Pack::MIN_BYTES);
        assert_eq!(pack, Pe1Pack { rpm: 9500, tps: 250 });
    }

    #[test]
    fn trailing_bytes_are_left_undecoded() {
        let bytes = [0x74, 0x04, 0xAA, 0xBB, 0xCC, 0xDD, 0x00, 0x01];
        let (pack, read): (Pe6Pack, usize) =
            bincode::decode_from_slice(&bytes, PE3_BINCODE_CONFIG).unwrap();
        assert_eq!(read, 2);
        assert_eq!(pack.battery_volt, 1140);
    }

    #[test]
    fn short_payload_fails() {
        let bytes = [0x1C, 0x25, 0xFA];
        let result: Result<(Pe1Pack, usize), _> =
            bincode::decode_from_slice(&bytes, PE3_BINCODE_CONFIG);
        assert!(result.is_err());
    }
}
