//! NTAG originality signature verification.
//!
//! NXP signs the 7-byte UID of every genuine NTAG21x chip with ECDSA on
//! secp128r1. The message is not hashed: the UID itself, read as a
//! big-endian integer, is the value being signed. The signature is stored
//! raw as `r || s`, 16 bytes each.
//!
//! The curve is small enough that plain affine arithmetic over
//! [`BigUint`] is fast enough for a one-off check. Nothing here is
//! constant-time; only public values are involved.

use num_bigint::BigUint;
use num_traits::Zero;

/// NXP's published originality public key (uncompressed `04 || X || Y`).
pub const NXP_PUBLIC_KEY: [u8; 33] = [
    0x04, 0x49, 0x4E, 0x1A, 0x38, 0x6D, 0x3D, 0x3C, 0xFE, 0x3D, 0xC1, 0x0E, 0x5D, 0xE6, 0x8A, 0x49,
    0x9B, 0x1C, 0x20, 0x2D, 0xB5, 0xB1, 0x32, 0x39, 0x3E, 0x89, 0xED, 0x19, 0xFE, 0x5B, 0xE8, 0xBC,
    0x61,
];

/// Length of a raw `r || s` signature.
pub const SIGNATURE_LEN: usize = 32;
/// Length of an NTAG UID.
pub const UID_LEN: usize = 7;

const P: [u8; 16] = [
    0xFF, 0xFF, 0xFF, 0xFD, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
];
const A: [u8; 16] = [
    0xFF, 0xFF, 0xFF, 0xFD, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFC,
];
const B: [u8; 16] = [
    0xE8, 0x75, 0x79, 0xC1, 0x10, 0x79, 0xF4, 0x3D, 0xD8, 0x24, 0x99, 0x3C, 0x2C, 0xEE, 0x5E, 0xD3,
];
const GX: [u8; 16] = [
    0x16, 0x1F, 0xF7, 0x52, 0x8B, 0x89, 0x9B, 0x2D, 0x0C, 0x28, 0x60, 0x7C, 0xA5, 0x2C, 0x5B, 0x86,
];
const GY: [u8; 16] = [
    0xCF, 0x5A, 0xC8, 0x39, 0x5B, 0xAF, 0xEB, 0x13, 0xC0, 0x2D, 0xA2, 0x92, 0xDD, 0xED, 0x7A, 0x83,
];
const N: [u8; 16] = [
    0xFF, 0xFF, 0xFF, 0xFE, 0x00, 0x00, 0x00, 0x00, 0x75, 0xA3, 0x0D, 0x1B, 0x90, 0x38, 0xA1, 0x15,
];

#[derive(Clone, Debug, PartialEq, Eq)]
struct Point {
    x: BigUint,
    y: BigUint,
}

/// Short Weierstrass curve `y^2 = x^3 + ax + b` over a prime field.
struct Curve {
    p: BigUint,
    a: BigUint,
    b: BigUint,
    n: BigUint,
    g: Point,
}

impl Curve {
    fn secp128r1() -> Self {
        Self {
            p: BigUint::from_bytes_be(&P),
            a: BigUint::from_bytes_be(&A),
            b: BigUint::from_bytes_be(&B),
            n: BigUint::from_bytes_be(&N),
            g: Point {
                x: BigUint::from_bytes_be(&GX),
                y: BigUint::from_bytes_be(&GY),
            },
        }
    }

    /// Inverse modulo a prime `m`.
    fn inv(v: &BigUint, m: &BigUint) -> BigUint {
        v.modpow(&(m - 2u32), m)
    }

    fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + &self.p - b) % &self.p
    }

    fn contains(&self, pt: &Point) -> bool {
        let lhs = (&pt.y * &pt.y) % &self.p;
        let rhs = (&pt.x * &pt.x * &pt.x + &self.a * &pt.x + &self.b) % &self.p;
        pt.x < self.p && pt.y < self.p && lhs == rhs
    }

    /// Decode an uncompressed SEC1 point.
    fn decode_point(&self, bytes: &[u8]) -> Option<Point> {
        let (&tag, coords) = bytes.split_first()?;
        if tag != 0x04 || coords.len() != 32 {
            return None;
        }
        let (x, y) = coords.split_at(16);
        let pt = Point {
            x: BigUint::from_bytes_be(x),
            y: BigUint::from_bytes_be(y),
        };
        self.contains(&pt).then_some(pt)
    }

    /// Point addition; `None` is the point at infinity.
    fn add(&self, lhs: Option<&Point>, rhs: Option<&Point>) -> Option<Point> {
        let (l, r) = match (lhs, rhs) {
            (None, r) => return r.cloned(),
            (l, None) => return l.cloned(),
            (Some(l), Some(r)) => (l, r),
        };
        let lambda = if l.x == r.x {
            if ((&l.y + &r.y) % &self.p).is_zero() {
                return None;
            }
            let num = (BigUint::from(3u32) * &l.x * &l.x + &self.a) % &self.p;
            let den = (BigUint::from(2u32) * &l.y) % &self.p;
            num * Self::inv(&den, &self.p) % &self.p
        } else {
            let num = self.sub(&r.y, &l.y);
            let den = self.sub(&r.x, &l.x);
            num * Self::inv(&den, &self.p) % &self.p
        };
        let x = self.sub(&self.sub(&(&lambda * &lambda % &self.p), &l.x), &r.x);
        let y = self.sub(&(lambda * self.sub(&l.x, &x) % &self.p), &l.y);
        Some(Point { x, y })
    }

    /// Scalar multiplication by double-and-add.
    fn mul(&self, k: &BigUint, pt: &Point) -> Option<Point> {
        let mut acc = None;
        for i in (0..k.bits()).rev() {
            acc = self.add(acc.as_ref(), acc.as_ref());
            if k.bit(i) {
                acc = self.add(acc.as_ref(), Some(pt));
            }
        }
        acc
    }

    fn verify(&self, public_key: &Point, message: &BigUint, r: &BigUint, s: &BigUint) -> bool {
        let in_range = |v: &BigUint| !v.is_zero() && v < &self.n;
        if !in_range(r) || !in_range(s) {
            return false;
        }
        let w = Self::inv(s, &self.n);
        let u1 = message * &w % &self.n;
        let u2 = r * &w % &self.n;
        let sum = self.add(
            self.mul(&u1, &self.g).as_ref(),
            self.mul(&u2, public_key).as_ref(),
        );
        match sum {
            Some(pt) => &(pt.x % &self.n) == r,
            None => false,
        }
    }
}

/// Verify an originality signature against an arbitrary public key.
///
/// Returns `false` for malformed keys, wrong UID or signature lengths, and
/// failed verification alike.
pub(crate) fn verify_with_key(public_key: &[u8], uid: &[u8], signature: &[u8]) -> bool {
    if uid.len() != UID_LEN || signature.len() != SIGNATURE_LEN {
        return false;
    }
    let curve = Curve::secp128r1();
    let Some(q) = curve.decode_point(public_key) else {
        return false;
    };
    let (r, s) = signature.split_at(SIGNATURE_LEN / 2);
    let message = BigUint::from_bytes_be(uid);
    curve.verify(&q, &message, &BigUint::from_bytes_be(r), &BigUint::from_bytes_be(s))
}

/// Check whether `signature` is NXP's originality signature over `uid`.
pub fn verify_ntag_signature(uid: &[u8], signature: &[u8]) -> bool {
    verify_with_key(&NXP_PUBLIC_KEY, uid, signature)
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    // private key 0x0123456789ABCDEF0123456789ABCDE
    const TEST_KEY: [u8; 33] =
        hex!("0448202fc3ecbce0f4ff9a3f07e967852db8ccfb71b8c8b6d9754ac9c1b820b3e7");
    const TEST_UID: [u8; 7] = hex!("04112233445566");
    const TEST_SIG: [u8; 32] =
        hex!("3c8396feaa4f4be4b0c69642399e7985e6efe44b9c0185da88319d764fcded99");

    #[test]
    fn curve_points_are_valid() {
        let curve = Curve::secp128r1();
        assert!(curve.contains(&curve.g));
        assert!(curve.decode_point(&NXP_PUBLIC_KEY).is_some());
        assert!(curve.decode_point(&TEST_KEY).is_some());
        assert_eq!(curve.mul(&curve.n, &curve.g), None);
    }

    #[test]
    fn known_signature_verifies() {
        assert!(verify_with_key(&TEST_KEY, &TEST_UID, &TEST_SIG));
    }

    #[test]
    fn altered_uid_or_signature_fails() {
        let mut uid = TEST_UID;
        uid[6] ^= 1;
        assert!(!verify_with_key(&TEST_KEY, &uid, &TEST_SIG));

        let mut sig = TEST_SIG;
        sig[31] ^= 0x80;
        assert!(!verify_with_key(&TEST_KEY, &TEST_UID, &sig));
    }

    #[test]
    fn malformed_inputs_return_false() {
        assert!(!verify_with_key(&TEST_KEY, &TEST_UID[..6], &TEST_SIG));
        assert!(!verify_with_key(&TEST_KEY, &TEST_UID, &TEST_SIG[..31]));
        assert!(!verify_with_key(&TEST_KEY[..32], &TEST_UID, &TEST_SIG));
        assert!(!verify_ntag_signature(&TEST_UID, &[0x00; 32]));
        assert!(!verify_ntag_signature(&TEST_UID, &[0xFF; 32]));
    }

    #[test]
    fn foreign_signature_does_not_verify_under_nxp_key() {
        assert!(!verify_ntag_signature(&TEST_UID, &TEST_SIG));
    }
}
