//! CCM* with AES-128, as used by IEEE 802.15.4 security.
//!
//! The MAC header is authenticated but never encrypted. With an encrypting
//! security level the payload is encrypted in place, with an
//! authentication-only level the payload is authenticated along with the
//! header. The MIC is written at the tail of the frame. Level `Enc` has no
//! MIC: the payload is only encrypted, with the CCM* key stream.

use core::ops::Range;

use aes::Aes128;
use ccm::aead::consts::{U13, U16, U4, U8};
use ccm::aead::generic_array::{ArrayLength, GenericArray};
use ccm::aead::{AeadInPlace, KeyInit};
use ccm::{Ccm, TagSize};
use ctr::cipher::{KeyIvInit, StreamCipher};
use wpan_frame::{Address, Frame, SecurityLevel, SecurityParams};

use super::key_store::{KeyStore, KeyValue, MAX_KEY_ID_LEN};
use super::tx_frame::TxFrame;
use crate::{Error, Result};

/// Length of the CCM* nonce.
pub const NONCE_LEN: usize = 13;

/// A CCM* nonce.
pub type Nonce = [u8; NONCE_LEN];

/// Build the nonce of a frame: the source extended address (most significant
/// octet first), the frame counter (big-endian) and the security level.
///
/// `ext_address` is in over-the-air (little-endian) order.
pub fn nonce(ext_address: &[u8; 8], frame_counter: u32, level: SecurityLevel) -> Nonce {
    let mut nonce = [0u8; NONCE_LEN];
    for (dst, src) in nonce[..8].iter_mut().zip(ext_address.iter().rev()) {
        *dst = *src;
    }
    nonce[8..12].copy_from_slice(&frame_counter.to_be_bytes());
    nonce[12] = level as u8;
    nonce
}

fn seal_with<M>(key: &KeyValue, nonce: &Nonce, aad: &[u8], msg: &mut [u8], mic: &mut [u8]) -> Result<()>
where
    M: ArrayLength<u8> + TagSize,
{
    let cipher = Ccm::<Aes128, M, U13>::new(GenericArray::from_slice(key));
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(nonce), aad, msg)
        .map_err(|_| Error::CryptoFailure)?;
    mic.copy_from_slice(&tag);
    Ok(())
}

fn open_with<M>(key: &KeyValue, nonce: &Nonce, aad: &[u8], msg: &mut [u8], mic: &[u8]) -> Result<()>
where
    M: ArrayLength<u8> + TagSize,
{
    let cipher = Ccm::<Aes128, M, U13>::new(GenericArray::from_slice(key));
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(nonce),
            aad,
            msg,
            GenericArray::from_slice(mic),
        )
        .map_err(|_| Error::CryptoFailure)
}

/// Encrypt or decrypt `msg` with the CCM* key stream, for a MIC of length 0.
///
/// The counter blocks are `flags ‖ nonce ‖ i` starting at `i = 1`, with the
/// flags holding `L - 1` for a 2-octet length field.
fn ctr_with(key: &KeyValue, nonce: &Nonce, msg: &mut [u8]) {
    let mut counter = [0u8; 16];
    counter[0] = 0x01;
    counter[1..14].copy_from_slice(nonce);
    counter[15] = 0x01;

    let mut cipher = ctr::Ctr128BE::<Aes128>::new(
        GenericArray::from_slice(key),
        GenericArray::from_slice(&counter),
    );
    cipher.apply_keystream(msg);
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Seal,
    Open,
}

/// Run CCM* over `frame[..mic.end]`, `header_len` octets of which are the MAC
/// header.
fn apply(
    direction: Direction,
    level: SecurityLevel,
    key: &KeyValue,
    nonce: &Nonce,
    frame: &mut [u8],
    header_len: usize,
    mic: Range<usize>,
) -> Result<()> {
    let (body, mic) = frame[..mic.end].split_at_mut(mic.start);

    // Authentication-only levels authenticate the payload as associated data.
    let (aad, msg): (&[u8], &mut [u8]) = if level.encrypts() {
        let (header, payload) = body.split_at_mut(header_len);
        (&*header, payload)
    } else {
        (&*body, &mut [][..])
    };

    macro_rules! run {
        ($m:ty) => {
            match direction {
                Direction::Seal => seal_with::<$m>(key, nonce, aad, msg, mic),
                Direction::Open => open_with::<$m>(key, nonce, aad, msg, mic),
            }
        };
    }

    match level.mic_len() {
        0 if level.encrypts() => {
            ctr_with(key, nonce, msg);
            Ok(())
        }
        4 => run!(U4),
        8 => run!(U8),
        16 => run!(U16),
        _ => Err(Error::CryptoFailure),
    }
}

/// Copy the key identifier of a frame out of its buffer.
fn key_id_of<T: AsRef<[u8]>>(frame: &Frame<T>) -> ([u8; MAX_KEY_ID_LEN], usize) {
    let mut key_id = [0u8; MAX_KEY_ID_LEN];
    let len = frame.key_id().len();
    key_id[..len].copy_from_slice(frame.key_id());
    (key_id, len)
}

fn check_params(params: &SecurityParams) -> Result<()> {
    // A TSCH nonce is built from the ASN, unknown here.
    if params.asn_in_nonce {
        return Err(Error::CryptoFailure);
    }
    Ok(())
}

/// Secure a frame in place.
///
/// The frame counter is allocated from `keys` and written into the frame,
/// unless the frame suppresses it, in which case 0 is used in the nonce.
/// `ext_address` is the extended address of this device, in over-the-air
/// order.
///
/// Frames without security, or with security level `None`, are left
/// untouched. A frame that was already secured is left untouched as well, so
/// the frame counter is never advanced twice for the same frame.
///
/// # Errors
///
/// [`Error::KeyNotFound`] if no key matches the key identifier of the frame,
/// [`Error::CounterOverflow`] if the frame counter is exhausted,
/// [`Error::CryptoFailure`] for a security level or nonce CCM* can not
/// handle.
pub fn encode(frame: &mut TxFrame, keys: &mut KeyStore, ext_address: &[u8; 8]) -> Result<()> {
    if frame.is_encoded() {
        return Ok(());
    }

    let mut parsed = Frame::new(frame.buffer_mut())?;

    let Some(params) = parsed.security().cloned() else {
        return Ok(());
    };
    if params.level == SecurityLevel::None {
        return Ok(());
    }
    check_params(&params)?;

    let (key_id, key_id_len) = key_id_of(&parsed);
    let key_id = &key_id[..key_id_len];

    let (frame_counter, key) = match params.frame_counter {
        Some(_) => {
            let (frame_counter, key) = keys.allocate_frame_counter(params.key_id_mode, key_id)?;
            parsed.set_frame_counter(frame_counter)?;
            (frame_counter, key)
        }
        None => (0, keys.get(params.key_id_mode, key_id)?.key_value),
    };

    let header_len = parsed.info().mac_header_len;
    frame.snapshot_header(header_len)?;

    let nonce = nonce(ext_address, frame_counter, params.level);
    apply(
        Direction::Seal,
        params.level,
        &key,
        &nonce,
        frame.buffer_mut(),
        header_len,
        params.mic.clone(),
    )?;

    frame.set_encoded();
    trace!("secured frame with counter {}", frame_counter);
    Ok(())
}

/// Verify and decrypt a received frame in place.
///
/// The nonce is built from the extended source address of the frame, or from
/// `peer_ext_address` (over-the-air order) when the frame does not carry one.
///
/// Returns the location of the plaintext payload.
///
/// # Errors
///
/// [`Error::MalformedFrame`] if the frame does not parse or is not secured,
/// [`Error::KeyNotFound`] if no key matches,
/// [`Error::CryptoFailure`] if the MIC does not verify or no source address
/// is known. Level `Enc` carries no MIC: its payload is decrypted without
/// being verified.
pub fn decrypt(
    frame: &mut [u8],
    keys: &KeyStore,
    peer_ext_address: Option<&[u8; 8]>,
) -> Result<Range<usize>> {
    let parsed = Frame::new_received(&frame[..])?;

    let params = parsed.security().cloned().ok_or(Error::MalformedFrame)?;
    let payload = parsed.info().payload.clone();
    if params.level == SecurityLevel::None {
        return Ok(payload);
    }
    check_params(&params)?;

    let ext_address = match parsed.src_address() {
        Address::Extended(mut address) => {
            address.reverse();
            address
        }
        _ => *peer_ext_address.ok_or(Error::CryptoFailure)?,
    };

    let (key_id, key_id_len) = key_id_of(&parsed);
    let key = keys
        .get(params.key_id_mode, &key_id[..key_id_len])?
        .key_value;
    let frame_counter = parsed.frame_counter().unwrap_or(0);
    let header_len = parsed.info().mac_header_len;

    let nonce = nonce(&ext_address, frame_counter, params.level);
    apply(
        Direction::Open,
        params.level,
        &key,
        &nonce,
        frame,
        header_len,
        params.mic.clone(),
    )?;

    Ok(payload)
}
