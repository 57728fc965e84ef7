//! Static car inventory.
//!
//! The read API is an external collaborator as far as the coordination core
//! is concerned; this fixed dataset stands in for it.

use crate::infrastructure::dto::http::CarDto;

/// The full inventory served by `GET /api/cars`
pub fn all_cars() -> Vec<CarDto> {
    fn car(
        id: u32,
        make: &str,
        model: &str,
        year: u32,
        price: u32,
        mileage: u32,
        body_style: &str,
        fuel_type: &str,
        transmission: &str,
        exterior_color: &str,
        features: &[&str],
    ) -> CarDto {
        CarDto {
            id,
            make: make.to_string(),
            model: model.to_string(),
            year,
            price,
            mileage,
            body_style: body_style.to_string(),
            fuel_type: fuel_type.to_string(),
            transmission: transmission.to_string(),
            exterior_color: exterior_color.to_string(),
            features: features.iter().map(|f| f.to_string()).collect(),
        }
    }

    vec![
        car(
            1, "Toyota", "RAV4", 2023, 32_900, 12_400, "SUV", "Gasoline", "Automatic", "Silver",
            &["All-Wheel Drive", "Adaptive Cruise Control", "Apple CarPlay"],
        ),
        car(
            2, "Honda", "Civic", 2022, 24_500, 18_750, "Sedan", "Gasoline", "CVT", "Blue",
            &["Lane Keep Assist", "Sunroof", "Heated Seats"],
        ),
        car(
            3, "Tesla", "Model 3", 2024, 42_990, 3_200, "Sedan", "Electric", "Automatic", "White",
            &["Autopilot", "Glass Roof", "Premium Audio"],
        ),
        car(
            4, "Ford", "F-150", 2021, 38_700, 41_000, "Truck", "Gasoline", "Automatic", "Black",
            &["Tow Package", "Crew Cab", "Bed Liner"],
        ),
        car(
            5, "Hyundai", "Ioniq 5", 2023, 39_450, 9_800, "SUV", "Electric", "Automatic", "Gray",
            &["Fast Charging", "Highway Driving Assist", "Digital Key"],
        ),
        car(
            6, "Subaru", "Outback", 2022, 29_300, 27_600, "Wagon", "Gasoline", "CVT", "Green",
            &["All-Wheel Drive", "Roof Rails", "EyeSight Safety Suite"],
        ),
        car(
            7, "BMW", "330i", 2023, 45_200, 8_900, "Sedan", "Gasoline", "Automatic", "Red",
            &["Sport Package", "Leather Interior", "Harman Kardon Audio"],
        ),
        car(
            8, "Chevrolet", "Bolt EUV", 2022, 26_800, 15_300, "SUV", "Electric", "Automatic", "Silver",
            &["One-Pedal Driving", "Wireless Charging", "Rear Camera Mirror"],
        ),
        car(
            9, "Mazda", "CX-5", 2023, 30_100, 11_200, "SUV", "Gasoline", "Automatic", "Soul Red",
            &["Premium Package", "Bose Audio", "360 View Monitor"],
        ),
        car(
            10, "Kia", "Telluride", 2023, 41_600, 14_500, "SUV", "Gasoline", "Automatic", "Dark Moss",
            &["Three-Row Seating", "Highway Driving Assist", "Tow Hitch"],
        ),
    ]
}
