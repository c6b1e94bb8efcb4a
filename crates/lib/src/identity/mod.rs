//! The identity primitive.
//!
//! Every entry and every map carries an [`Identity`], an element of the discrete
//! Heisenberg group over Z_p. The group law is associative but not commutative,
//! which lets a function application fold its arguments in a fixed canonical
//! order, while the separate coordinate-wise [`accumulate`](Identity::accumulate)
//! folds map fields independently of their order.
//!
//! Leaf identities come from SHA-256 digests under distinct domain tags, so a
//! field name and a value that renders to the same text never collide.

mod errors;
pub mod id;

pub use errors::IdentityError;
pub use id::ID;

use sha2::{Digest, Sha256};

use crate::constants::{FUNCTION_DOMAIN, ID_LENGTH, MODULUS, NAME_DOMAIN, SUBRANGE_DOMAIN};

const P: u64 = MODULUS;
const LOW_MASK: u64 = (1 << 54) - 1;
const B_MASK: u128 = (1 << 53) - 1;

/// Capability of anything that carries an identity.
///
/// User-supplied callables implement this (through [`Appliable`](crate::Appliable))
/// instead of exposing ad hoc attributes.
pub trait Identifiable {
    /// The identity of this object.
    fn identity(&self) -> Identity;

    /// The textual id of this object.
    fn id(&self) -> ID {
        self.identity().id()
    }
}

/// An element of the identity group.
///
/// `combine` (also `*`) is the group law, `reverse` its inverse and
/// [`Identity::ZERO`] the neutral element. `accumulate` (also `+`) is a
/// commutative sum used when folding the fields of a map.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Identity {
    a: u64,
    b: u64,
    c: u64,
}

fn add_mod(x: u64, y: u64) -> u64 {
    (x + y) % P
}

fn mul_mod(x: u64, y: u64) -> u64 {
    ((x as u128 * y as u128) % P as u128) as u64
}

fn neg_mod(x: u64) -> u64 {
    if x == 0 { 0 } else { P - x }
}

fn word(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_be_bytes(buf)
}

impl Identity {
    /// The neutral element of the group.
    pub const ZERO: Identity = Identity { a: 0, b: 0, c: 0 };

    /// Derive an identity from a domain tag and a sequence of byte parts.
    ///
    /// Each part is length-prefixed so that part boundaries are unambiguous.
    pub(crate) fn digest(domain: &[u8], parts: &[&[u8]]) -> Identity {
        let mut hasher = Sha256::new();
        hasher.update((domain.len() as u64).to_be_bytes());
        hasher.update(domain);
        for part in parts {
            hasher.update((part.len() as u64).to_be_bytes());
            hasher.update(part);
        }
        let hash = hasher.finalize();
        Identity {
            a: word(&hash[0..8]) % P,
            b: word(&hash[8..16]) % P,
            c: word(&hash[16..24]) % P,
        }
    }

    /// Identity of a field name, hashed from its raw bytes.
    pub fn of_name(name: &str) -> Identity {
        Self::digest(NAME_DOMAIN, &[name.as_bytes()])
    }

    /// Identity of a function descriptor (name plus optional version tag).
    pub fn of_function(descriptor: &str) -> Identity {
        Self::digest(FUNCTION_DOMAIN, &[descriptor.as_bytes()])
    }

    /// The group law. Order matters: `a.combine(b) != b.combine(a)` in general.
    pub fn combine(&self, other: &Identity) -> Identity {
        Identity {
            a: add_mod(self.a, other.a),
            b: add_mod(self.b, other.b),
            c: add_mod(add_mod(self.c, other.c), mul_mod(self.a, other.b)),
        }
    }

    /// The group inverse.
    ///
    /// Used to tell a function being applied apart from the same function
    /// stored as a value.
    pub fn reverse(&self) -> Identity {
        Identity {
            a: neg_mod(self.a),
            b: neg_mod(self.b),
            c: add_mod(neg_mod(self.c), mul_mod(self.a, self.b)),
        }
    }

    /// Commutative, associative sum; `ZERO` is its neutral element too.
    pub fn accumulate(&self, other: &Identity) -> Identity {
        Identity {
            a: add_mod(self.a, other.a),
            b: add_mod(self.b, other.b),
            c: add_mod(self.c, other.c),
        }
    }

    /// Identity of the `index`-th component out of `total` produced by the
    /// computation identified by `self`.
    pub fn subrange(&self, index: usize, total: usize) -> Identity {
        let id = self.id();
        Self::digest(
            SUBRANGE_DOMAIN,
            &[
                id.as_bytes(),
                &(index as u64).to_be_bytes(),
                &(total as u64).to_be_bytes(),
            ],
        )
    }

    /// Returns true for the neutral element.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Render as a 40-character hex id.
    ///
    /// The three 53-bit coordinates are packed into 160 bits (the last one in
    /// a 54-bit slot).
    pub fn id(&self) -> ID {
        let hi = ((self.a as u128) << 53) | self.b as u128;
        let top = hi >> 10;
        let low = (((hi & 0x3ff) as u64) << 54) | self.c;
        let mut bytes = [0u8; 20];
        bytes[..12].copy_from_slice(&top.to_be_bytes()[4..]);
        bytes[12..].copy_from_slice(&low.to_be_bytes());
        ID::from_hex(hex::encode(bytes))
    }

    /// Parse a 40-character hex id back into a group element.
    pub fn from_id(id: &str) -> Result<Identity, IdentityError> {
        if id.len() != ID_LENGTH {
            return Err(IdentityError::InvalidLength {
                expected: ID_LENGTH,
                got: id.len(),
            });
        }
        if !id.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)) {
            return Err(IdentityError::InvalidHex(id.to_string()));
        }
        let bytes = hex::decode(id).map_err(|e| IdentityError::InvalidHex(e.to_string()))?;

        let mut top_bytes = [0u8; 16];
        top_bytes[4..].copy_from_slice(&bytes[..12]);
        let top = u128::from_be_bytes(top_bytes);
        let low = word(&bytes[12..]);

        let hi = (top << 10) | (low >> 54) as u128;
        let identity = Identity {
            a: (hi >> 53) as u64,
            b: (hi & B_MASK) as u64,
            c: low & LOW_MASK,
        };
        if identity.a >= P || identity.b >= P || identity.c >= P {
            return Err(IdentityError::OutOfRange(id.to_string()));
        }
        Ok(identity)
    }
}

impl std::ops::Mul for Identity {
    type Output = Identity;

    fn mul(self, rhs: Identity) -> Identity {
        self.combine(&rhs)
    }
}

impl std::ops::Add for Identity {
    type Output = Identity;

    fn add(self, rhs: Identity) -> Identity {
        self.accumulate(&rhs)
    }
}

impl std::ops::AddAssign for Identity {
    fn add_assign(&mut self, rhs: Identity) {
        *self = self.accumulate(&rhs);
    }
}

impl std::ops::Not for Identity {
    type Output = Identity;

    fn not(self) -> Identity {
        self.reverse()
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Identity({})", self.id())
    }
}

impl Identifiable for Identity {
    fn identity(&self) -> Identity {
        *self
    }
}

impl TryFrom<&ID> for Identity {
    type Error = IdentityError;

    fn try_from(id: &ID) -> Result<Self, Self::Error> {
        Identity::from_id(id.as_str())
    }
}
