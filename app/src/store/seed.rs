// app/src/store/seed.rs

use super::Store;
use crate::errors::Result;
use crate::models::{Car, CarFilter, CarInput, DealershipInput};
use tracing::info;

fn car(brand: &str, model: &str, year: i32, price: i64, range_km: i32, featured: bool) -> CarInput {
  CarInput {
    brand: brand.to_string(),
    model: model.to_string(),
    year,
    price,
    range_km,
    battery_capacity: None,
    acceleration_0_100: None,
    top_speed: None,
    charging_time_hours: None,
    exterior_color: None,
    interior_color: None,
    images: Vec::new(),
    features: Vec::new(),
    specifications: None,
    is_featured: featured,
    availability_status: None,
  }
}

/// Fills an empty catalog with a handful of vehicles and one showroom.
pub async fn seed_catalog(store: &dyn Store) -> Result<()> {
  if !store.list_cars(&CarFilter::default()).await?.is_empty() {
    info!("Catalog already has rows, skipping seed.");
    return Ok(());
  }

  let cars = [
    car("Tesla", "Model 3", 2024, 45_000_000, 513, true),
    car("Hyundai", "Ioniq 5", 2024, 38_500_000, 488, true),
    car("BYD", "Atto 3", 2023, 27_000_000, 420, false),
    car("Kia", "EV6", 2024, 41_000_000, 528, false),
  ];
  for input in cars {
    store.insert_car(&Car::from_input(input)?).await?;
  }

  let showroom = DealershipInput {
    name: "CARPLUTO Lekki Showroom".to_string(),
    address: "Plot 5, Admiralty Way, Lekki Phase 1".to_string(),
    city: "Lagos".to_string(),
    state: "Lagos".to_string(),
    phone: Some("+234-902-1475-523".to_string()),
    email: Some("lekki@carpluto.com".to_string()),
    features: vec!["Test drives".to_string(), "Fast charging".to_string()],
    is_active: true,
  };
  store.insert_dealership(&showroom.into_dealership()?).await?;

  info!("Seeded catalog with sample vehicles and a showroom.");
  Ok(())
}
