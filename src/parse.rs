use nom::{
    bytes::complete::{tag, take_while_m_n},
    combinator::{all_consuming, map_res, opt},
    sequence::tuple,
    IResult,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

fn from_hex(input: &str) -> Result<u8, std::num::ParseIntError> {
    u8::from_str_radix(input, 16)
}

fn is_hex_digit(c: char) -> bool {
    c.is_ascii_hexdigit()
}

fn hex_primary(input: &str) -> IResult<&str, u8> {
    map_res(take_while_m_n(2, 2, is_hex_digit), from_hex)(input)
}

/// Parses `rrggbb` or `#rrggbb`; map color keys arrive without the hash.
pub fn parse_hex_rgb(input: &str) -> IResult<&str, Rgb> {
    let (input, _) = opt(tag("#"))(input)?;
    let (input, (r, g, b)) = tuple((hex_primary, hex_primary, hex_primary))(input)?;
    Ok((input, Rgb { r, g, b }))
}

/// The RGB value of a color key, or `None` when the key is not a full hex
/// color.
pub fn color_rgb(key: &str) -> Option<Rgb> {
    all_consuming(parse_hex_rgb)(key).ok().map(|(_, rgb)| rgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0896d7", Some(Rgb { r: 0x08, g: 0x96, b: 0xd7 }))]
    #[case("#bd1038", Some(Rgb { r: 0xbd, g: 0x10, b: 0x38 }))]
    #[case("ffffff", Some(Rgb { r: 255, g: 255, b: 255 }))]
    #[case("fff", None)]
    #[case("0896d7aa", None)]
    #[case("not a color", None)]
    #[case("", None)]
    fn color_keys(#[case] key: &str, #[case] expected: Option<Rgb>) {
        assert_eq!(color_rgb(key), expected);
    }
}
