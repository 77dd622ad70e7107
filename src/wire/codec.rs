//! Encode/decode operations named in spec §4.1.

use crate::io::Checksum;
use crate::wire::{Packet, ACK_LEN, HEADER_LEN, MAX_PACKET_LEN, MAX_PAYLOAD};

/// Writes a checksum into the first two bytes of `buf`, with the checksum
/// field zeroed during the recomputation, per spec §3's invariant.
fn patch_checksum(buf: &mut [u8], checksum: &dyn Checksum) {
    buf[0] = 0;
    buf[1] = 0;
    let cksum = checksum.checksum(buf);
    buf[0..2].copy_from_slice(&cksum.to_be_bytes());
}

/// `encode_ack(rcv_nxt) -> bytes[8]`.
pub fn encode_ack(ackno: u32, checksum: &dyn Checksum) -> [u8; ACK_LEN] {
    let mut buf = [0u8; ACK_LEN];
    buf[2..4].copy_from_slice(&(ACK_LEN as u16).to_be_bytes());
    buf[4..8].copy_from_slice(&ackno.to_be_bytes());
    patch_checksum(&mut buf, checksum);
    buf
}

/// `encode_data(seqno, payload) -> bytes[12+len(payload)]`. An empty
/// `payload` produces the len=12 EOF shape.
pub fn encode_data(seqno: u32, payload: &[u8], checksum: &dyn Checksum) -> Vec<u8> {
    debug_assert!(payload.len() <= MAX_PAYLOAD);

    let total_len = HEADER_LEN + payload.len();
    let mut buf = vec![0u8; total_len];
    buf[2..4].copy_from_slice(&(total_len as u16).to_be_bytes());
    // ackno field is unused on data/EOF packets but present for fixed header
    // alignment, matching the original wire format's layout.
    buf[4..8].copy_from_slice(&0u32.to_be_bytes());
    buf[8..12].copy_from_slice(&seqno.to_be_bytes());
    buf[12..].copy_from_slice(payload);
    patch_checksum(&mut buf, checksum);
    buf
}

/// `decode(bytes, n) -> Packet | Invalid`. Returns `None` for any corrupt,
/// short, or length-mismatched input; the codec never signals an error
/// upward (spec §4.1, §7).
pub fn decode(bytes: &[u8], checksum: &dyn Checksum) -> Option<Packet> {
    let n = bytes.len();

    if n < ACK_LEN {
        return None;
    }

    let len = u16::from_be_bytes([bytes[2], bytes[3]]) as usize;
    if len != n {
        return None;
    }

    if n > ACK_LEN && n < HEADER_LEN {
        return None;
    }

    if n > MAX_PACKET_LEN {
        return None;
    }

    let mut scratch = bytes.to_vec();
    scratch[0] = 0;
    scratch[1] = 0;
    let recomputed = checksum.checksum(&scratch);
    let carried = u16::from_be_bytes([bytes[0], bytes[1]]);
    if recomputed != carried {
        return None;
    }

    if n == ACK_LEN {
        let ackno = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        return Some(Packet::Ack { ackno });
    }

    let seqno = u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    if n == HEADER_LEN {
        return Some(Packet::Eof { seqno });
    }

    Some(Packet::Data {
        seqno,
        payload: bytes[HEADER_LEN..n].to_vec(),
    })
}
