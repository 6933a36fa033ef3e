//! Modbus RTU CRC-16 engine
//!
//! Polynomial 0xA001 (reflected 0x8005), initial value 0xFFFF. The two CRC
//! bytes go on the wire low byte first.

/// Compute the Modbus RTU CRC-16 over an arbitrary byte sequence.
///
/// Total over any input length; the empty sequence yields the initial value
/// 0xFFFF unchanged.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Append the CRC of `data` to it, low byte first
pub fn append_crc(mut data: Vec<u8>) -> Vec<u8> {
    let crc = crc16(&data);
    data.extend_from_slice(&crc.to_le_bytes());
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(crc16(&[]), 0xFFFF);
    }

    #[test]
    fn test_known_vectors() {
        // Read two holding registers from address 0: wire frame 01 03 00 00 00 02 C4 0B
        assert_eq!(crc16(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x02]), 0x0BC4);
        // Read four coils from address 0
        assert_eq!(crc16(&[0x01, 0x01, 0x00, 0x00, 0x00, 0x04]), 0xC93D);
        // Exception response
        assert_eq!(crc16(&[0x01, 0x83, 0x02]), 0xF1C0);
    }

    #[test]
    fn test_deterministic() {
        let data = [0x11, 0x22, 0x33, 0x44, 0x55];
        assert_eq!(crc16(&data), crc16(&data));
    }

    #[test]
    fn test_append_crc_wire_order() {
        let framed = append_crc(vec![0x01, 0x03, 0x00, 0x00, 0x00, 0x02]);
        // Low byte first on the wire
        assert_eq!(framed, vec![0x01, 0x03, 0x00, 0x00, 0x00, 0x02, 0xC4, 0x0B]);
    }
}
