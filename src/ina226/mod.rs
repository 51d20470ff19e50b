//! INA226 chip driver (2.5µV/LSB shunt ADC).

pub mod driver;
pub mod registers;

pub use driver::Ina226Driver;
