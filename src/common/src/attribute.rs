use crate::error::HoradrimError;
use std::str::FromStr;

/// Handle attributes. Pairs the name with the dtype.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Attribute dtype.
    pub dtype: DataType,
}

impl Attribute {
    pub fn new(name: String, dtype: DataType) -> Self {
        Self { name, dtype }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }
}

/// Enumerate the supported dtypes. The stored representation of every field
/// is a string; the dtype governs ordering only.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Debug)]
pub enum DataType {
    Str,
    Int,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Str => write!(f, "str"),
            DataType::Int => write!(f, "int"),
        }
    }
}

impl FromStr for DataType {
    type Err = HoradrimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "str" => Ok(DataType::Str),
            "int" => Ok(DataType::Int),
            other => Err(HoradrimError::Internal(format!(
                "unknown field type {:?}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dtype_round_trip() {
        assert_eq!("str".parse::<DataType>().unwrap(), DataType::Str);
        assert_eq!("int".parse::<DataType>().unwrap(), DataType::Int);
        assert_eq!(DataType::Str.to_string(), "str");
        assert_eq!(DataType::Int.to_string(), "int");
        assert!("float".parse::<DataType>().is_err());
    }
}
