//! Request signing as performed by the platform's mobile client.
//!
//! Every request carries five headers (`n`, `t`, `s`, `m`, `v`) derived from
//! its form body. The server recomputes the digest from the same inputs, so
//! every step below has to match byte for byte:
//!
//! 1. drop exempt fields (free-form user text)
//! 2. walk the remaining fields in ascending name order
//! 3. concatenate the values that contain no punctuation
//! 4. append the Unix timestamp in seconds
//! 5. append 20 characters picked from [`LOOKUP`] by random indices
//! 6. strip whitespace, `<`, `>`, `&`, `-` and astral-plane characters
//! 7. percent-encode the result, then take its hex MD5

use std::collections::BTreeMap;
use std::sync::Arc;

use md5::{Digest, Md5};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::Rng;

/// Client version reported in the `v` header.
pub const CLIENT_VERSION: &str = "1.6.36";

/// Number of nonce characters mixed into each signature.
pub const NONCE_LEN: usize = 20;

/// Character table the nonce indices select from.
pub const LOOKUP: [char; 62] = [
    '5', 'b', 'f', 'A', 'J', 'Q', 'g', 'a', 'l', 'p', 's', 'q', 'H', '4', 'L', 'Q', 'g', '1', '6',
    'Q', 'Z', 'v', 'w', 'b', 'c', 'e', '2', '2', 'm', 'l', 'E', 'g', 'G', 'H', 'I', 'r', 'o', 's',
    'd', '5', '7', 'x', 't', 'J', 'S', 'T', 'F', 'v', 'w', '4', '8', '9', '0', 'K', 'E', '3', '4',
    '0', 'm', 'r', 'i', 'n',
];

/// Field names excluded from the digest. The list is also sent verbatim in `n`.
pub const EXEMPT_FIELDS: &[&str] = &[
    "content",
    "deviceName",
    "keyWord",
    "blogBody",
    "blogTitle",
    "getType",
    "responsibilities",
    "street",
    "text",
    "reason",
    "searchvalue",
    "key",
    "answers",
    "leaveReason",
    "personRemark",
    "selfAppraisal",
    "imgUrl",
    "wxname",
    "deviceId",
    "avatarTempPath",
    "file",
    "file",
    "model",
    "brand",
    "system",
    "deviceId",
    "platform",
];

/// Values containing any of these are left out of the digest.
const PUNCTUATION: &[char] = &[
    '`', '~', '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '+', '=', '|', '{', '}', '\'',
    ':', ';', ',', '[', ']', '.', '<', '>', '/', '?', '！', '￥', '…', '（', '）', '—', '【',
    '】', '‘', '；', '：', '”', '“', '’', '。', '，', '、', '？',
];

/// Same escaping as the browser's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Source of the random lookup indices.
pub trait NonceSource: Send + Sync {
    /// Returns `count` indices, each in `0..bound`.
    fn indices(&self, count: usize, bound: usize) -> Vec<usize>;
}

/// Draws indices from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngNonce;

impl NonceSource for ThreadRngNonce {
    fn indices(&self, count: usize, bound: usize) -> Vec<usize> {
        let mut rng = rand::thread_rng();
        (0..count).map(|_| rng.gen_range(0..bound)).collect()
    }
}

/// Replays a fixed index sequence, cycling when it runs out.
#[derive(Debug, Clone)]
pub struct FixedNonce(pub Vec<usize>);

impl NonceSource for FixedNonce {
    fn indices(&self, count: usize, bound: usize) -> Vec<usize> {
        if self.0.is_empty() {
            return vec![0; count];
        }
        self.0.iter().cycle().take(count).map(|i| i % bound).collect()
    }
}

/// The five signature headers attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignHeaders {
    /// Comma-joined exempt field names.
    pub n: String,
    /// Unix timestamp in seconds.
    pub t: String,
    /// Nonce indices joined by `_`.
    pub s: String,
    /// Hex MD5 digest.
    pub m: String,
    /// Client version.
    pub v: String,
}

impl SignHeaders {
    /// Header name/value pairs in the order the client sends them.
    pub fn pairs(&self) -> [(&'static str, &str); 5] {
        [
            ("n", self.n.as_str()),
            ("t", self.t.as_str()),
            ("s", self.s.as_str()),
            ("m", self.m.as_str()),
            ("v", self.v.as_str()),
        ]
    }
}

/// Computes signature headers for request bodies.
#[derive(Clone)]
pub struct SignatureEngine {
    nonce: Arc<dyn NonceSource>,
}

impl std::fmt::Debug for SignatureEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureEngine").finish_non_exhaustive()
    }
}

impl Default for SignatureEngine {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRngNonce))
    }
}

impl SignatureEngine {
    pub fn new(nonce: Arc<dyn NonceSource>) -> Self {
        Self { nonce }
    }

    /// Signs `form` with the current time.
    pub fn sign(&self, form: &BTreeMap<String, String>) -> SignHeaders {
        self.sign_at(form, chrono::Utc::now().timestamp())
    }

    /// Signs `form` as of Unix time `now`.
    pub fn sign_at(&self, form: &BTreeMap<String, String>, now: i64) -> SignHeaders {
        let nonce = self.nonce.indices(NONCE_LEN, LOOKUP.len());
        Self::sign_with(form, &nonce, now)
    }

    /// Deterministic core of the algorithm.
    ///
    /// Indices are reduced into the lookup table before use, so the `s` header
    /// always names the characters that were hashed.
    pub fn sign_with(form: &BTreeMap<String, String>, nonce: &[usize], now: i64) -> SignHeaders {
        let nonce: Vec<usize> = nonce.iter().map(|i| i % LOOKUP.len()).collect();
        let mut buffer = String::new();
        // BTreeMap iterates in ascending key order
        for (name, value) in form {
            if EXEMPT_FIELDS.contains(&name.as_str()) {
                continue;
            }
            if value.contains(PUNCTUATION) {
                continue;
            }
            buffer.push_str(value);
        }

        let timestamp = now.to_string();
        buffer.push_str(&timestamp);
        buffer.extend(nonce.iter().map(|&i| LOOKUP[i]));

        let cleaned: String = buffer
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '<' | '>' | '&' | '-'))
            .filter(|c| u32::from(*c) <= 0xFFFF)
            .collect();

        let encoded = utf8_percent_encode(&cleaned, URI_COMPONENT).to_string();
        let digest = hex::encode(Md5::digest(encoded.as_bytes()));

        SignHeaders {
            n: EXEMPT_FIELDS.join(","),
            t: timestamp,
            s: nonce
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("_"),
            m: digest,
            v: CLIENT_VERSION.to_string(),
        }
    }
}
