#![allow(clippy::module_name_repetitions)]

pub trait Register {
    const ADDRESS: u8;
}

pub trait ReadRegister: Register {
    fn from_bits(bits: u16) -> Self;
}

pub trait WriteRegister: Register {
    fn as_bits(&self) -> u16;
}
