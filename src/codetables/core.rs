use num_enum::{TryFromPrimitive, TryFromPrimitiveError};

/// A code table entry, either known by name or kept as its raw number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code<Enum, N> {
    Name(Enum),
    Num(N),
}

impl<Enum, N> Code<Enum, N> {
    pub fn name(&self) -> Option<&Enum> {
        match self {
            Self::Name(e) => Some(e),
            Self::Num(_) => None,
        }
    }
}

impl<Enum, N> From<Result<Enum, TryFromPrimitiveError<Enum>>> for Code<Enum, N>
where
    Enum: TryFromPrimitive<Primitive = N>,
{
    fn from(result: Result<Enum, TryFromPrimitiveError<Enum>>) -> Self {
        match result {
            Ok(e) => Self::Name(e),
            Err(TryFromPrimitiveError { number: n }) => Self::Num(n),
        }
    }
}
