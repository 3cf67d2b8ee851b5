use common::decimal::{
    dec, format_units, from_decimal, mul_div, parse_units, price, to_decimal, token,
    ONE_TOKEN, PRICE_DECIMALS, TOKEN_DECIMALS,
};
use common::error::Error;

#[test]
fn test_parse_token_amounts() {
    assert_eq!(token::parse("6").unwrap(), 6 * ONE_TOKEN);
    assert_eq!(token::parse("0.018").unwrap(), 18_000_000_000_000_000);
    assert_eq!(token::parse("0.5").unwrap(), 500_000_000_000_000_000);
    assert_eq!(token::parse(" 1000000 ").unwrap(), 1_000_000 * ONE_TOKEN);
    assert_eq!(token::parse("0").unwrap(), 0);
}

#[test]
fn test_parse_rejects_bad_input() {
    assert!(matches!(token::parse("-1"), Err(Error::ValidationError(_))));
    assert!(matches!(token::parse("abc"), Err(Error::DecimalError(_))));
    // 9 fractional digits do not fit the price scale
    assert!(matches!(price::parse("1.000000001"), Err(Error::DecimalError(_))));
}

#[test]
fn test_price_scale() {
    assert_eq!(price::parse("600").unwrap(), 60_000_000_000);
    assert_eq!(price::parse("50").unwrap(), 5_000_000_000);
    assert_eq!(price::format(60_000_000_000), "600");
}

#[test]
fn test_format_units() {
    assert_eq!(format_units(6 * ONE_TOKEN, TOKEN_DECIMALS), "6");
    assert_eq!(format_units(18_000_000_000_000_000, TOKEN_DECIMALS), "0.018");
    assert_eq!(format_units(6_018_000_000_000_000_000, TOKEN_DECIMALS), "6.018");
    assert_eq!(format_units(1, TOKEN_DECIMALS), "0.000000000000000001");
    assert_eq!(format_units(0, PRICE_DECIMALS), "0");
}

#[test]
fn test_format_units_beyond_u128_scale() {
    assert_eq!(format_units(0, 40), "0");
    assert_eq!(format_units(5, 40), format!("0.{}5", "0".repeat(39)));
    assert_eq!(format_units(u128::MAX, 39), format!("0.{}", u128::MAX));
}

#[test]
fn test_decimal_conversions() {
    assert_eq!(from_decimal(dec!(0.012), TOKEN_DECIMALS).unwrap(), 12_000_000_000_000_000);
    assert_eq!(from_decimal(dec!(4.000), TOKEN_DECIMALS).unwrap(), 4 * ONE_TOKEN);
    assert_eq!(to_decimal(12_000_000_000_000_000, TOKEN_DECIMALS).unwrap(), dec!(0.012));
    assert_eq!(to_decimal(4 * ONE_TOKEN, TOKEN_DECIMALS).unwrap(), dec!(4));
    assert_eq!(parse_units("1.5", 2).unwrap(), 150);
}

#[test]
fn test_mul_div_truncates() {
    assert_eq!(mul_div(10, 3, 4).unwrap(), 7);
    assert_eq!(mul_div(1, 1, 3).unwrap(), 0);
    assert_eq!(mul_div(6 * ONE_TOKEN, 3, 1000).unwrap(), 18_000_000_000_000_000);
}

#[test]
fn test_mul_div_widens_intermediate_product() {
    // The product overflows u128 but the quotient does not
    let quantity = u128::MAX / 2;
    assert_eq!(mul_div(quantity, 1_000, 1_000).unwrap(), quantity);
    assert_eq!(mul_div(u128::MAX, u128::MAX, u128::MAX).unwrap(), u128::MAX);
}

#[test]
fn test_mul_div_errors() {
    assert!(matches!(mul_div(1, 1, 0), Err(Error::ArithmeticOverflow(_))));
    assert!(matches!(mul_div(u128::MAX, 2, 1), Err(Error::ArithmeticOverflow(_))));
}
