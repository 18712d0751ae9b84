//! Hash helpers: blake3 en hex, y el combinador simétrico (XOR) usado por los
//! `version_hash` de steps y pipelines.

use blake3::Hasher;
use serde_json::Value;

use super::to_canonical_json;

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

/// Hashea un valor JSON sobre su forma canónica.
pub fn hash_value(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}

/// XOR de digests hex. Los digests se alinean a la derecha (como enteros),
/// por lo que el resultado es independiente del orden de entrada.
///
/// Devuelve `None` si no hay digests o alguno no es hex válido.
pub fn xor_digests<I, S>(digests: I) -> Option<String>
    where I: IntoIterator<Item = S>,
          S: AsRef<str>
{
    let mut acc: Vec<u8> = Vec::new();
    let mut seen = false;
    for digest in digests {
        let bytes = decode_hex(digest.as_ref())?;
        if bytes.len() > acc.len() {
            let mut widened = vec![0u8; bytes.len() - acc.len()];
            widened.extend_from_slice(&acc);
            acc = widened;
        }
        let offset = acc.len() - bytes.len();
        for (i, b) in bytes.iter().enumerate() {
            acc[offset + i] ^= b;
        }
        seen = true;
    }
    if !seen {
        return None;
    }
    Some(acc.iter().map(|b| format!("{b:02x}")).collect())
}

fn decode_hex(input: &str) -> Option<Vec<u8>> {
    let input = input.trim();
    // longitud impar: se completa con un cero a la izquierda
    let padded = if input.len() % 2 == 1 { format!("0{input}") } else { input.to_string() };
    (0..padded.len()).step_by(2)
                     .map(|i| padded.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
                     .collect()
}
