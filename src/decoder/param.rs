use crate::{
    codetables::{Code, Table5_1},
    error::DecodeError,
    helpers::read_as,
    regulation::{GribInt, to_grib_uint},
};

/// Scale parameters of Data Representation Template 5.0.
///
/// A packed value `X` is unpacked as `(R + X * 2^E) / 10^D`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplePackingParam {
    /// Reference value `R`.
    pub ref_val: f32,
    /// Binary scale factor `E`.
    pub exp: i16,
    /// Decimal scale factor `D`.
    pub dig: i16,
    /// Number of bits used for each packed value.
    pub nbit: u8,
    /// Type of original field values, code table 5.1.
    pub original_field_type: u8,
}

impl SimplePackingParam {
    /// Parameters of a floating point field.
    pub fn new(ref_val: f32, exp: i16, dig: i16, nbit: u8) -> Self {
        Self {
            ref_val,
            exp,
            dig,
            nbit,
            original_field_type: Table5_1::FloatingPoint.into(),
        }
    }

    pub fn with_original_field_type(self, original_field_type: u8) -> Self {
        Self {
            original_field_type,
            ..self
        }
    }

    /// Builds parameters from the raw scale factors as stored in the
    /// template, i.e. with the sign in the most significant bit.
    pub fn from_raw(ref_val: f32, raw_exp: u16, raw_dig: u16, nbit: u8) -> Self {
        Self::new(ref_val, raw_exp.as_grib_int(), raw_dig.as_grib_int(), nbit)
    }

    /// Reads the 10 octets of template 5.0 that follow the template number.
    ///
    /// `buf` must hold at least 10 octets.
    pub(crate) fn from_buf(buf: &[u8]) -> Result<Self, DecodeError> {
        let ref_val = read_as!(f32, buf, 0);
        let exp = read_as!(u16, buf, 4);
        let dig = read_as!(u16, buf, 6);
        let nbit = read_as!(u8, buf, 8);
        let original_field_type_value = read_as!(u8, buf, 9);

        // Unpacking is the same for both types.
        if !matches!(
            Table5_1::try_from(original_field_type_value),
            Ok(Table5_1::FloatingPoint | Table5_1::Integer)
        ) {
            return Err(DecodeError::NotSupported(
                "GRIB2 code table 5.1 (type of original field values)",
                original_field_type_value.into(),
            ));
        }

        Ok(Self::from_raw(ref_val, exp, dig, nbit)
            .with_original_field_type(original_field_type_value))
    }

    pub(crate) fn to_definition(self) -> SimplePackingDefinition {
        SimplePackingDefinition {
            ref_val: self.ref_val,
            exp: to_grib_uint(self.exp.into(), 16) as u16,
            dig: to_grib_uint(self.dig.into(), 16) as u16,
            nbit: self.nbit,
            original_field_type: self.original_field_type,
        }
    }
}

/// Template 5.0 with its fields as encoded in the message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplePackingDefinition {
    pub ref_val: f32,
    pub exp: u16,
    pub dig: u16,
    pub nbit: u8,
    pub original_field_type: u8,
}

impl SimplePackingDefinition {
    pub fn original_field_type(&self) -> Code<Table5_1, u8> {
        Table5_1::try_from(self.original_field_type).into()
    }
}
