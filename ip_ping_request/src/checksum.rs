/// Internet checksum (RFC 1071) of `data`.
///
/// Words are read big-endian and the result is meant to be written back
/// big-endian, which puts the same bytes on the wire as the native order
/// formulation of the RFC on any host. An odd trailing byte is padded with a
/// zero byte.
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum = 0u32;
    let mut words = data.chunks_exact(2);
    for word in &mut words {
        sum += u16::from_be_bytes([word[0], word[1]]) as u32;
        // Keep the accumulator in range for arbitrarily long buffers
        sum = (sum & 0xFF_FF) + (sum >> 16);
    }
    if let [last] = words.remainder() {
        sum += u16::from_be_bytes([*last, 0]) as u32;
    }
    while sum >> 16 != 0 {
        sum = (sum & 0xFF_FF) + (sum >> 16);
    }
    !(sum as u16)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_buffer() {
        assert_eq!(checksum(&[]), 0xFF_FF);
    }

    #[test]
    fn zero_buffers() {
        for len in [2, 8, 64, 1500] {
            assert_eq!(checksum(&vec![0; len]), 0xFF_FF);
        }
    }

    #[test]
    fn rfc1071_example() {
        let data = [0x00, 0x01, 0xf2, 0x03, 0xf4, 0xf5, 0xf6, 0xf7];
        assert_eq!(checksum(&data), 0x22_0d);
    }

    #[test]
    fn odd_length() {
        assert_eq!(checksum(&[0x01]), 0xFE_FF);
        // Same as the even buffer with an explicit padding byte
        let data = [0x00, 0x01, 0xf2, 0x03, 0xf4];
        assert_eq!(checksum(&data), checksum(&[0x00, 0x01, 0xf2, 0x03, 0xf4, 0x00]));
    }

    #[test]
    fn carry_is_folded() {
        // 0xFFFF + 0x0001 overflows into bit 16
        assert_eq!(checksum(&[0xFF, 0xFF, 0x00, 0x01]), 0xFF_FE);
        assert_eq!(checksum(&[0xFF; 4096]), 0x00_00);
    }

    #[test]
    fn matches_pnet() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1001).collect();
        assert_eq!(checksum(&data), pnet::util::checksum(&data, data.len()));
    }

    #[test]
    fn self_verification() {
        let packets: [&[u8]; 3] = [
            &[8, 0, 0, 0, 0, 0, 0, 0],
            &[8, 0, 0, 0, 0x12, 0x34, 0xab, 0xcd],
            &[8, 0, 0, 0, 0xff, 0xff, 0xff, 0xff, 1, 2, 3, 4, 5, 6, 7, 8],
        ];
        for packet in packets.iter() {
            let mut packet = packet.to_vec();
            let sum = checksum(&packet);
            packet[2..4].copy_from_slice(&sum.to_be_bytes());
            assert_eq!(checksum(&packet), 0);
        }
    }
}
