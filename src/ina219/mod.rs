//! INA219 chip driver (10µV/LSB shunt ADC).

pub mod driver;
pub mod registers;

pub use driver::Ina219Driver;
