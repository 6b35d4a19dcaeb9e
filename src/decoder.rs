use tracing::debug;

pub use self::{
    param::{SimplePackingDefinition, SimplePackingParam},
    simple::{
        ScaleFunc, SimplePacking, SimplePackingDecodeIterator, SimplePackingDecodeIteratorWrapper,
        SimplePackingReader,
    },
    stream::{BitCursor, FixedValueIterator, NBitwiseIterator},
};
use crate::{
    codetables::{Code, Table5_0},
    error::*,
    helpers::{ensure_len, read_as},
};

mod param;
mod simple;
mod stream;

/// Common interface of data representation templates.
pub trait DataRepresentation {
    /// Returns the number of values encoded in the field.
    fn num_vals(&self) -> usize;

    /// Returns the template contents, if the template is understood.
    fn definition(&self) -> Option<ReprDefinition>;

    /// Decodes all values of the field from the data section payload.
    fn decode_all<T: AsRef<[u8]>>(&self, cursor: &mut BitCursor<T>)
    -> Result<Vec<f32>, GribError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum ReprDefinition {
    SimplePacking(SimplePackingDefinition),
}

impl DataRepresentation for SimplePacking {
    fn num_vals(&self) -> usize {
        SimplePacking::num_vals(self)
    }

    fn definition(&self) -> Option<ReprDefinition> {
        Some(ReprDefinition::SimplePacking(SimplePacking::definition(self)))
    }

    fn decode_all<T: AsRef<[u8]>>(
        &self,
        cursor: &mut BitCursor<T>,
    ) -> Result<Vec<f32>, GribError> {
        SimplePacking::decode_all(self, cursor)
    }
}

/// A data representation template as found in section 5.
///
/// Templates other than 5.0 are recognised so that they can be reported, but
/// cannot be decoded.
///
/// # Examples
///
/// ```
/// use gribpoint::{BitCursor, DataRepresentation, ReprTemplate};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let sect5 = [
///         0x00, 0x00, 0x00, 0x15, 0x05, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x41, 0x20, 0x00,
///         0x00, 0x00, 0x00, 0x00, 0x01, 0x08, 0x00,
///     ];
///     let repr = ReprTemplate::from_sect5_bytes(&sect5)?;
///     assert_eq!(repr.num_vals(), 2);
///
///     let payload = [0x05, 0x0a];
///     assert_eq!(repr.decode_all(&mut BitCursor::new(&payload))?, vec![1.5, 2.0]);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ReprTemplate {
    SimplePacking(SimplePacking),
    Unsupported { template_num: u16, num_vals: usize },
}

impl ReprTemplate {
    /// Interprets `template_octets`, the octets following the template
    /// number in section 5, as template `template_num`.
    pub fn new(
        template_num: u16,
        template_octets: &[u8],
        num_vals: usize,
    ) -> Result<Self, GribError> {
        let kind = Table5_0::try_from(template_num);
        let template = match kind {
            Ok(Table5_0::SimplePacking) => {
                Self::SimplePacking(SimplePacking::from_template(template_octets, num_vals)?)
            }
            _ => Self::Unsupported {
                template_num,
                num_vals,
            },
        };
        let name = kind.map_or("unknown", |kind| kind.short_name());
        debug!(template_num, name, num_vals, "data representation template read");
        Ok(template)
    }

    /// Reads a whole section 5, starting from its length octets.
    pub fn from_sect5_bytes(buf: &[u8]) -> Result<Self, GribError> {
        ensure_len(buf, 11, "section 5")?;
        let sect_num = read_as!(u8, buf, 4);
        if sect_num != 5 {
            return Err(GribError::InvalidValue(format!(
                "expected section 5, found section {sect_num}"
            )));
        }
        let num_vals = read_as!(u32, buf, 5) as usize;
        let template_num = read_as!(u16, buf, 9);
        Self::new(template_num, &buf[11..], num_vals)
    }

    pub fn template_num(&self) -> u16 {
        match self {
            Self::SimplePacking(_) => Table5_0::SimplePacking.into(),
            Self::Unsupported { template_num, .. } => *template_num,
        }
    }

    pub fn template(&self) -> Code<Table5_0, u16> {
        Table5_0::try_from(self.template_num()).into()
    }
}

impl DataRepresentation for ReprTemplate {
    fn num_vals(&self) -> usize {
        match self {
            Self::SimplePacking(packing) => packing.num_vals(),
            Self::Unsupported { num_vals, .. } => *num_vals,
        }
    }

    fn definition(&self) -> Option<ReprDefinition> {
        match self {
            Self::SimplePacking(packing) => DataRepresentation::definition(packing),
            Self::Unsupported { .. } => None,
        }
    }

    fn decode_all<T: AsRef<[u8]>>(
        &self,
        cursor: &mut BitCursor<T>,
    ) -> Result<Vec<f32>, GribError> {
        match self {
            Self::SimplePacking(packing) => packing.decode_all(cursor),
            Self::Unsupported { template_num, .. } => {
                Err(DecodeError::TemplateNumberUnsupported(*template_num).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sect5(template_num: u16, template: &[u8]) -> Vec<u8> {
        let len = (11 + template.len()) as u32;
        let mut buf = len.to_be_bytes().to_vec();
        buf.push(5);
        buf.extend_from_slice(&4u32.to_be_bytes());
        buf.extend_from_slice(&template_num.to_be_bytes());
        buf.extend_from_slice(template);
        buf
    }

    const SIMPLE_TEMPLATE: [u8; 10] = [0x41, 0x20, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x08, 0x00];

    #[test]
    fn simple_packing_template_is_decodable() -> Result<(), Box<dyn std::error::Error>> {
        let repr = ReprTemplate::from_sect5_bytes(&sect5(0, &SIMPLE_TEMPLATE))?;
        assert_eq!(repr.template(), Code::Name(Table5_0::SimplePacking));
        assert_eq!(repr.num_vals(), 4);

        let payload = [0x00, 0x01, 0x02, 0x03];
        let values = repr.decode_all(&mut BitCursor::new(&payload))?;
        assert_eq!(values, vec![1.0, 1.1, 1.2, 1.3]);

        let Some(ReprDefinition::SimplePacking(def)) = repr.definition() else {
            panic!("simple packing definition expected");
        };
        assert_eq!(def.dig, 1);
        assert_eq!(def.nbit, 8);
        Ok(())
    }

    #[test]
    fn integer_valued_field_is_decodable() -> Result<(), Box<dyn std::error::Error>> {
        let mut template = SIMPLE_TEMPLATE;
        template[9] = 1;
        let repr = ReprTemplate::from_sect5_bytes(&sect5(0, &template))?;

        let payload = [0x00, 0x01, 0x02, 0x03];
        let values = repr.decode_all(&mut BitCursor::new(&payload))?;
        assert_eq!(values, vec![1.0, 1.1, 1.2, 1.3]);

        let Some(ReprDefinition::SimplePacking(def)) = repr.definition() else {
            panic!("simple packing definition expected");
        };
        assert_eq!(
            def.original_field_type(),
            Code::Name(crate::codetables::Table5_1::Integer)
        );
        Ok(())
    }

    macro_rules! test_unsupported_templates {
        ($(($name:ident, $template_num:expr, $expected:expr),)*) => ($(
            #[test]
            fn $name() -> Result<(), Box<dyn std::error::Error>> {
                let repr = ReprTemplate::from_sect5_bytes(&sect5($template_num, &[0; 30]))?;
                assert_eq!(repr.template(), $expected);
                assert_eq!(repr.num_vals(), 4);
                assert_eq!(repr.definition(), None);

                let payload = [0u8; 8];
                let err = repr.decode_all(&mut BitCursor::new(&payload)).unwrap_err();
                assert!(matches!(
                    err,
                    GribError::DecodeError(DecodeError::TemplateNumberUnsupported(n))
                        if n == $template_num
                ));
                Ok(())
            }
        )*);
    }

    test_unsupported_templates! {
        (complex_packing_is_unsupported, 2, Code::Name(Table5_0::ComplexPacking)),
        (
            complex_packing_and_spatial_differencing_is_unsupported,
            3,
            Code::Name(Table5_0::ComplexPackingAndSpatialDifferencing)
        ),
        (jpeg2000_is_unsupported, 40, Code::Name(Table5_0::Jpeg2000)),
        (png_is_unsupported, 41, Code::Name(Table5_0::Png)),
        (ccsds_is_unsupported, 42, Code::Name(Table5_0::Ccsds)),
        (run_length_packing_is_unsupported, 200, Code::Name(Table5_0::RunLengthPacking)),
        (unknown_template_is_unsupported, 61, Code::Num(61)),
    }

    #[test]
    fn other_section_is_rejected() {
        let mut buf = sect5(0, &SIMPLE_TEMPLATE);
        buf[4] = 4;
        assert!(matches!(
            ReprTemplate::from_sect5_bytes(&buf),
            Err(GribError::InvalidValue(_))
        ));
    }

    #[test]
    fn short_section_is_rejected() {
        assert!(matches!(
            ReprTemplate::from_sect5_bytes(&[0, 0, 0, 9, 5]),
            Err(GribError::InvalidValue(_))
        ));
    }
}
