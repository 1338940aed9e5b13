//! # secp256k1 Domain Parameters
//!
//! Curve constants, scalar range checks and the point arithmetic needed for
//! public-key recovery. All comparisons against the group order run in
//! constant time via `subtle`.

use k256::elliptic_curve::group::Group;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::PrimeField;
use k256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar, U256};
use subtle::{Choice, ConstantTimeEq};

use crate::errors::CryptoError;
use crate::keys::{PublicKey, PUBLIC_KEY_LENGTH};

/// Group order `n`.
pub const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// `n / 2`, rounded down. Canonical signatures have `s <= SECP256K1_HALF_ORDER`.
pub const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Field prime `p`.
pub const SECP256K1_FIELD_PRIME: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE, 0xFF, 0xFF, 0xFC, 0x2F,
];

// =============================================================================
// SCALAR CHECKS
// =============================================================================

/// Constant-time big-endian comparison. Returns `(less, greater)`.
fn ct_compare(a: &[u8; 32], b: &[u8; 32]) -> (Choice, Choice) {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for (&a_byte, &b_byte) in a.iter().zip(b.iter()) {
        let not_decided = !(less | greater);
        less |= not_decided & Choice::from((a_byte < b_byte) as u8);
        greater |= not_decided & Choice::from((a_byte > b_byte) as u8);
    }

    (less, greater)
}

fn ct_is_zero(value: &[u8; 32]) -> Choice {
    let mut is_zero = Choice::from(1u8);
    for byte in value {
        is_zero &= byte.ct_eq(&0u8);
    }
    is_zero
}

/// True iff `1 <= scalar < n`.
pub fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let (less, _) = ct_compare(scalar, &SECP256K1_ORDER);
    (!ct_is_zero(scalar) & less).into()
}

/// True iff `s > n/2`. Equality with the half order is still low.
pub fn is_high_s(s: &[u8; 32]) -> bool {
    let (_, greater) = ct_compare(s, &SECP256K1_HALF_ORDER);
    greater.into()
}

/// Compute `n - s`.
pub fn invert_s(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;

    for i in (0..32).rev() {
        let diff = (SECP256K1_ORDER[i] as i32) - (s[i] as i32) - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }

    result
}

/// Replace a high `s` with `n - s`; low values are returned unchanged.
pub fn canonicalize_s(s: &[u8; 32]) -> [u8; 32] {
    if is_high_s(s) {
        invert_s(s)
    } else {
        *s
    }
}

/// Reject zero and anything not below the group order.
pub fn validate_private_key(key: &[u8; 32]) -> Result<(), CryptoError> {
    if is_valid_scalar(key) {
        Ok(())
    } else {
        Err(CryptoError::PrivateKeyOutOfRange)
    }
}

// =============================================================================
// POINT OPERATIONS
// =============================================================================

/// Compute `d * G` and return it in 65-byte uncompressed form.
pub fn derive_public_key(private_key: &[u8; 32]) -> Result<PublicKey, CryptoError> {
    validate_private_key(private_key)?;
    let scalar = Option::<Scalar>::from(Scalar::from_repr(*FieldBytes::from_slice(private_key)))
        .ok_or(CryptoError::PrivateKeyOutOfRange)?;
    let point = (ProjectivePoint::GENERATOR * scalar).to_affine();
    encode_uncompressed(&point).ok_or(CryptoError::InvalidPublicKey)
}

fn encode_uncompressed(point: &AffinePoint) -> Option<PublicKey> {
    let encoded = point.to_encoded_point(false);
    let bytes: [u8; PUBLIC_KEY_LENGTH] = encoded.as_bytes().try_into().ok()?;
    Some(PublicKey::from_array(bytes))
}

/// Decompress the point with x-coordinate `x` and the given y parity
/// (`false` = even). Returns `None` when `x >= p`, when `x` is not on the
/// curve, or when the point fails the subgroup check.
pub fn decompress_point(x: &[u8; 32], y_odd: bool) -> Option<ProjectivePoint> {
    let (below_prime, _) = ct_compare(x, &SECP256K1_FIELD_PRIME);
    if !bool::from(below_prime) {
        return None;
    }

    let mut compressed = [0u8; 33];
    compressed[0] = if y_odd { 0x03 } else { 0x02 };
    compressed[1..].copy_from_slice(x);

    let encoded = EncodedPoint::from_bytes(compressed).ok()?;
    let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))?;
    let point = ProjectivePoint::from(affine);

    // n * R = O. Always holds: the cofactor is 1, so every curve point is in the subgroup.
    let order_times_point = point * -Scalar::ONE + point;
    if bool::from(order_times_point.is_identity()) {
        Some(point)
    } else {
        None
    }
}

/// Recover the signer's public key from `(r, s, v)` over `digest`.
///
/// `Q = r^-1 * (s*R - e*G)` where `R` is the point with x-coordinate `r` and
/// y parity `v`. Returns `None` for `v > 1`, out-of-range scalars, or any
/// intermediate point that is invalid.
pub fn recover_public_key(
    digest: &[u8; 32],
    r: &[u8; 32],
    s: &[u8; 32],
    v: u8,
) -> Option<PublicKey> {
    if v > 1 || !is_valid_scalar(r) || !is_valid_scalar(s) {
        return None;
    }

    let big_r = decompress_point(r, v == 1)?;
    let r_scalar = Option::<Scalar>::from(Scalar::from_repr(*FieldBytes::from_slice(r)))?;
    let s_scalar = Option::<Scalar>::from(Scalar::from_repr(*FieldBytes::from_slice(s)))?;
    let e = <Scalar as Reduce<U256>>::reduce_bytes(FieldBytes::from_slice(digest));
    let r_inv = Option::<Scalar>::from(r_scalar.invert())?;

    let q = (big_r * s_scalar - ProjectivePoint::GENERATOR * e) * r_inv;
    if bool::from(q.is_identity()) {
        return None;
    }

    encode_uncompressed(&q.to_affine())
}
