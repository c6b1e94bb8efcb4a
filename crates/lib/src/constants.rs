//! Constants used throughout the idmap library.
//!
//! This module provides central definitions for the identity encoding, the
//! field-name conventions and the store persistence format.

/// Length of the textual form of an identity.
pub const ID_LENGTH: usize = 40;

/// Modulus of the identity group, the largest prime below 2^53.
pub const MODULUS: u64 = (1 << 53) - 111;

/// Suffix marking a mirror field, a derived view of its sibling.
pub const MIRROR_SUFFIX: char = '_';

/// Prefix reserved for metafields; a metafield is written `_name_`.
pub const META_MARKER: char = '_';

/// Domain tag for identities derived from field names.
pub(crate) const NAME_DOMAIN: &[u8] = b"idmap:name";

/// Domain tag for identities derived from values.
pub(crate) const VALUE_DOMAIN: &[u8] = b"idmap:value";

/// Domain tag for identities derived from function descriptors.
pub(crate) const FUNCTION_DOMAIN: &[u8] = b"idmap:function";

/// Domain tag for identities of multi-output components.
pub(crate) const SUBRANGE_DOMAIN: &[u8] = b"idmap:subrange";

/// The current store persistence file format version.
pub const PERSISTENCE_VERSION: u8 = 0;
