use rand::Rng;

const CODE_LETTERS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Generate a room code in the `ABCD-1234` format.
///
/// Letters never include `I` or `O`.
pub fn generate_room_code(rng: &mut impl Rng) -> String {
    let mut code = String::with_capacity(9);
    for _ in 0..4 {
        let idx = rng.random_range(0..CODE_LETTERS.len());
        code.push(CODE_LETTERS[idx] as char);
    }
    code.push('-');
    for _ in 0..4 {
        code.push(char::from(b'0' + rng.random_range(0..10u8)));
    }
    code
}

/// Check that a code has the `ABCD-1234` shape.
pub fn is_valid_room_code(code: &str) -> bool {
    let Some((letters, digits)) = code.split_once('-') else {
        return false;
    };
    letters.len() == 4
        && digits.len() == 4
        && letters.bytes().all(|b| CODE_LETTERS.contains(&b))
        && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn generated_codes_are_valid() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let code = generate_room_code(&mut rng);
            assert!(is_valid_room_code(&code), "bad code {code}");
        }
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(!is_valid_room_code("ABCD1234"));
        assert!(!is_valid_room_code("ABC-1234"));
        assert!(!is_valid_room_code("ABCD-12A4"));
        assert!(!is_valid_room_code("ABOD-1234"));
    }
}
