use reqcorder_types::{ContentHash, HASH_LEN};

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"reqcorder-template-v1"`) that is
/// prepended to every hash computation, so a template and a request with
/// identical bytes produce different identities. The BLAKE3 output is read
/// to [`HASH_LEN`] bytes, giving a 32-character hex name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for canonical template bytes.
    pub const TEMPLATE: Self = Self {
        domain: "reqcorder-template-v1",
    };
    /// Hasher for canonical request bytes.
    pub const REQUEST: Self = Self {
        domain: "reqcorder-request-v1",
    };

    #[cfg(test)]
    const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ContentHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        let mut digest = [0u8; HASH_LEN];
        hasher.finalize_xof().fill(&mut digest);
        ContentHash::from_digest(digest)
    }

    /// Verify that data produces the expected hash.
    pub fn verify(&self, data: &[u8], expected: &ContentHash) -> bool {
        self.hash(data) == *expected
    }

    #[cfg(test)]
    fn domain(&self) -> &str {
        self.domain
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let data = b"url: https://example1.com\n";
        assert_eq!(ContentHasher::TEMPLATE.hash(data), ContentHasher::TEMPLATE.hash(data));
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let data = b"same content";
        assert_ne!(ContentHasher::TEMPLATE.hash(data), ContentHasher::REQUEST.hash(data));
    }

    #[test]
    fn known_vector_is_stable() {
        // The XOF prefix equals the default 32-byte output.
        let expected = {
            let mut hasher = blake3::Hasher::new();
            hasher.update(b"reqcorder-template-v1:abc");
            let full = hasher.finalize();
            let mut digest = [0u8; HASH_LEN];
            digest.copy_from_slice(&full.as_bytes()[..HASH_LEN]);
            ContentHash::from_digest(digest)
        };
        assert_eq!(ContentHasher::TEMPLATE.hash(b"abc"), expected);
    }

    #[test]
    fn hex_is_filesystem_safe() {
        let hex = ContentHasher::REQUEST.hash(b"anything").to_hex();
        assert_eq!(hex.len(), 32);
        assert!(hex.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    }

    #[test]
    fn verify_correct_and_tampered_data() {
        let id = ContentHasher::REQUEST.hash(b"original");
        assert!(ContentHasher::REQUEST.verify(b"original", &id));
        assert!(!ContentHasher::REQUEST.verify(b"tampered", &id));
    }

    #[test]
    fn custom_domain() {
        let hasher = ContentHasher::new("my-custom-domain-v1");
        assert_eq!(hasher.domain(), "my-custom-domain-v1");
        assert_ne!(hasher.hash(b"data"), ContentHasher::TEMPLATE.hash(b"data"));
    }

    proptest! {
        #[test]
        fn equal_bytes_hash_equal(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(ContentHasher::TEMPLATE.hash(&data), ContentHasher::TEMPLATE.hash(&data.clone()));
        }

        #[test]
        fn differing_bytes_hash_differently(
            a in proptest::collection::vec(any::<u8>(), 0..64),
            b in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            prop_assume!(a != b);
            prop_assert_ne!(ContentHasher::REQUEST.hash(&a), ContentHasher::REQUEST.hash(&b));
        }
    }
}
