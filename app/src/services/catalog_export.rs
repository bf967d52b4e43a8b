// app/src/services/catalog_export.rs

use crate::models::Car;

pub const CSV_HEADER: [&str; 6] = ["Brand", "Model", "Year", "Price", "Range (km)", "Status"];

/// Quotes a field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
  if value.contains([',', '"', '\n', '\r']) {
    format!("\"{}\"", value.replace('"', "\"\""))
  } else {
    value.to_string()
  }
}

/// One header line plus one line per car, in the given order, CRLF terminated.
pub fn cars_to_csv(cars: &[Car]) -> String {
  let mut out = CSV_HEADER.join(",");
  out.push_str("\r\n");
  for car in cars {
    let row = [
      csv_field(&car.brand),
      csv_field(&car.model),
      car.year.to_string(),
      car.price.to_string(),
      car.range_km.to_string(),
      csv_field(&car.availability_status),
    ];
    out.push_str(&row.join(","));
    out.push_str("\r\n");
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::car::tests::sample_input;

  #[test]
  fn one_row_per_car_in_column_order() {
    let cars = vec![
      Car::from_input(sample_input("Tesla", "Model 3", 45_000_000)).unwrap(),
      Car::from_input(sample_input("BYD", "Atto 3", 27_000_000)).unwrap(),
    ];
    let csv = cars_to_csv(&cars);
    let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Brand,Model,Year,Price,Range (km),Status");
    assert_eq!(lines[1], "Tesla,Model 3,2024,45000000,450,available");
    assert_eq!(lines[2], "BYD,Atto 3,2024,27000000,450,available");
  }

  #[test]
  fn fields_with_delimiters_are_quoted() {
    let car = Car::from_input(sample_input("Mercedes, Benz", "EQS \"580\"", 120_000_000)).unwrap();
    let csv = cars_to_csv(&[car]);
    assert!(csv.contains("\"Mercedes, Benz\",\"EQS \"\"580\"\"\","));
  }

  #[test]
  fn empty_catalog_is_header_only() {
    assert_eq!(cars_to_csv(&[]), "Brand,Model,Year,Price,Range (km),Status\r\n");
  }
}
