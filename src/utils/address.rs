use alloy_primitives::Address;
use std::str::FromStr;

/// Length of an EVM address in hex digits, without the `0x` prefix
const ADDRESS_HEX_LEN: usize = 40;

/// Checks that `input` is an EVM address: `0x` followed by 40 hex digits.
///
/// All-lowercase and all-uppercase input is accepted as plain hex. Mixed-case input
/// must carry a valid EIP-55 checksum.
pub fn is_valid_address(input: &str) -> bool {
    let hex = match input.strip_prefix("0x") {
        Some(hex) if hex.len() == ADDRESS_HEX_LEN => hex,
        _ => return false,
    };

    let has_lower = hex.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(input, None).is_ok()
    } else {
        Address::from_str(input).is_ok()
    }
}
