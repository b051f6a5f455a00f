//! Product line grammar: `<qty> <code> <description> <unit price> <total price>`.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::trace;

use super::rules::{PACKET_SUFFIX, PRODUCT_LINE};
use crate::error::LineError;
use crate::models::item::{ProductLine, UNKNOWN_SECTION};

/// Decode one product line.
///
/// Fails with [`LineError::NoMatch`] when the line does not fit the grammar, and
/// with [`LineError::OutOfRange`] when it does but the quantity exceeds `u64` or
/// a price exceeds what a `Decimal` holds.
pub fn parse_product_line(text: &str, section: Option<&str>) -> Result<ProductLine, LineError> {
    let caps = PRODUCT_LINE.captures(text).ok_or(LineError::NoMatch)?;

    let quantity: u64 = caps[1]
        .parse()
        .map_err(|_| out_of_range("Quantity", &caps[1]))?;
    let product_code = caps[2].trim().to_string();
    let (description, packet_quantity) = split_packet_quantity(caps[3].trim());
    let unit_price = Decimal::from_str(&caps[4]).map_err(|_| out_of_range("Unit Price", &caps[4]))?;
    let total_price =
        Decimal::from_str(&caps[5]).map_err(|_| out_of_range("Total Price", &caps[5]))?;

    let unit_price_per_item = packet_quantity.map(|packet| {
        let mut per_item = (unit_price / Decimal::from(packet))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        per_item.rescale(2);
        per_item
    });

    trace!("Parsed product line {:?} -> {} x {}", text, quantity, product_code);

    Ok(ProductLine {
        section: section.unwrap_or(UNKNOWN_SECTION).to_string(),
        quantity,
        product_code,
        description,
        packet_quantity,
        unit_price,
        total_price,
        unit_price_per_item,
    })
}

fn out_of_range(field: &'static str, value: &str) -> LineError {
    LineError::OutOfRange {
        field,
        value: value.to_string(),
    }
}

/// Separate a trailing `(n)` packet quantity from a trimmed description.
fn split_packet_quantity(description: &str) -> (String, Option<u32>) {
    match packet_suffix(description) {
        Some((start, packet)) => (description[..start].trim_end().to_string(), Some(packet)),
        None => (description.to_string(), None),
    }
}

fn packet_suffix(description: &str) -> Option<(usize, u32)> {
    let caps = PACKET_SUFFIX.captures(description)?;
    let packet: u32 = caps[1].parse().ok()?;
    if packet == 0 {
        return None;
    }
    Some((caps.get(0)?.start(), packet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_with_packet_quantity() {
        let line = parse_product_line("2 ABC12 WIDGET SMALL (10) 1.00 2.00", Some("Frozen")).unwrap();

        assert_eq!(
            line,
            ProductLine {
                section: "Frozen".to_string(),
                quantity: 2,
                product_code: "ABC12".to_string(),
                description: "WIDGET SMALL".to_string(),
                packet_quantity: Some(10),
                unit_price: dec("1.00"),
                total_price: dec("2.00"),
                unit_price_per_item: Some(dec("0.10")),
            }
        );
        assert_eq!(line.unit_price_per_item.unwrap().to_string(), "0.10");
    }

    #[test]
    fn test_parse_without_packet_quantity() {
        let line = parse_product_line("3 XYZ99 GADGET 5.00 14.00", None).unwrap();

        assert_eq!(line.section, "Unknown");
        assert_eq!(line.quantity, 3);
        assert_eq!(line.product_code, "XYZ99");
        assert_eq!(line.description, "GADGET");
        assert_eq!(line.packet_quantity, None);
        assert_eq!(line.unit_price_per_item, None);
        assert_eq!(line.total_price.to_string(), "14.00");
    }

    #[test]
    fn test_no_match() {
        for text in [
            "not a product line",
            "",
            "2 ABC12 WIDGET 1.00",
            "2 abc12 widget 1.00 2.00",
        ] {
            assert_eq!(parse_product_line(text, None), Err(LineError::NoMatch));
        }
    }

    #[test]
    fn test_values_beyond_limits_are_out_of_range() {
        assert_eq!(
            parse_product_line("99999999999999999999 ABCDE BULK 1.00 1.00", None),
            Err(LineError::OutOfRange {
                field: "Quantity",
                value: "99999999999999999999".to_string(),
            })
        );

        let huge = format!("{}.00", "9".repeat(40));
        let err = parse_product_line(&format!("1 ABCDE BULK {} 1.00", huge), None).unwrap_err();
        assert_eq!(
            err,
            LineError::OutOfRange {
                field: "Unit Price",
                value: huge.clone(),
            }
        );
        assert_eq!(err.to_string(), format!("Unit Price out of range: {}", huge));

        // u64::MAX itself still parses
        let line = parse_product_line("18446744073709551615 ABCDE BULK 1.00 1.00", None).unwrap();
        assert_eq!(line.quantity, u64::MAX);
    }

    #[test]
    fn test_inner_parentheses_are_not_packet_quantity() {
        let line = parse_product_line("1 QRS45 TRAY (6) PACK 4.00 4.00", None).unwrap();
        assert_eq!(line.description, "TRAY (6) PACK");
        assert_eq!(line.packet_quantity, None);

        let line = parse_product_line("1 QRS45 CASE 12345 12.00 12.00", None).unwrap();
        assert_eq!(line.description, "CASE 12345");
        assert_eq!(line.packet_quantity, None);
    }

    #[test]
    fn test_long_or_zero_suffix_stays_in_description() {
        let line = parse_product_line("1 QRS45 BULK (12345) 4.00 4.00", None).unwrap();
        assert_eq!(line.description, "BULK (12345)");
        assert_eq!(line.packet_quantity, None);

        let line = parse_product_line("1 QRS45 SAMPLE (0) 4.00 4.00", None).unwrap();
        assert_eq!(line.description, "SAMPLE (0)");
        assert_eq!(line.packet_quantity, None);
        assert_eq!(line.unit_price_per_item, None);
    }

    #[test]
    fn test_zero_quantity_parses() {
        let line = parse_product_line("0 10045 PEAS 1.25 0.00", None).unwrap();
        assert_eq!(line.quantity, 0);
    }

    #[test]
    fn test_per_item_price_rounding() {
        let line = parse_product_line("1 MNO77 SODA (24) 10.99 10.99", None).unwrap();
        assert_eq!(line.unit_price_per_item, Some(dec("0.46")));

        // 0.125 rounds half to even
        let line = parse_product_line("1 MNO77 MINTS (8) 1.00 1.00", None).unwrap();
        assert_eq!(line.unit_price_per_item, Some(dec("0.12")));
    }

    #[test]
    fn test_round_trip() {
        let lines = [
            "2 ABC12 WIDGET SMALL (10) 1.00 2.00",
            "3 XYZ99 GADGET 5.00 14.00",
            "12 10045 GREEN PEAS 2LB 3.49 41.88",
            "1 AB 12 TWO WORD CODE (4) 8.00 8.00",
            "0 QQQQQ FREE SAMPLE 0.00 0.00",
        ];

        for text in lines {
            let line = parse_product_line(text, None).unwrap();
            assert_eq!(line.to_line(), text);
        }
    }

    #[test]
    fn test_deterministic() {
        let text = "4 LMN34 CHICKEN WINGS (12) 24.00 96.00";
        assert_eq!(
            parse_product_line(text, Some("Frozen")),
            parse_product_line(text, Some("Frozen"))
        );
    }
}
