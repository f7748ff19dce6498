use crate::attribute::{Attribute, DataType};
use crate::error::{h_err, HoradrimError};
use itertools::Itertools;

/// Handle schemas.
#[derive(Serialize, Deserialize, Default, PartialEq, Eq, Clone, Debug)]
pub struct TypeSchema {
    /// Attributes of the schema, in declared order.
    pub attributes: Vec<Attribute>,
}

impl TypeSchema {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    /// Create a new schema with the given names and dtypes.
    pub fn from_vecs(names: Vec<&str>, dtypes: Vec<DataType>) -> Self {
        let mut attrs = Vec::new();
        for (name, dtype) in names.iter().zip(dtypes.iter()) {
            attrs.push(Attribute::new(name.to_string(), *dtype));
        }
        TypeSchema::new(attrs)
    }

    /// Get the attribute from the given index.
    pub fn get_attribute(&self, i: usize) -> Option<&Attribute> {
        self.attributes.get(i)
    }

    /// Get an iterator of the attributes.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    /// Returns the length of the schema.
    pub fn size(&self) -> usize {
        self.attributes.len()
    }
}

/// A user-defined type: the unit the catalog stores.
///
/// The primary-key position is a 1-based ordinal into the declared field
/// list. Type names are unique across the entire catalog.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct TypeInfo {
    /// Type name.
    pub name: String,
    /// 1-based position of the primary-key field among the declared fields.
    pub pk_position: usize,
    /// Declared fields.
    pub schema: TypeSchema,
}

impl TypeInfo {
    pub fn new(name: String, pk_position: usize, schema: TypeSchema) -> Result<Self, HoradrimError> {
        if pk_position == 0 || pk_position > schema.size() {
            return Err(h_err(&format!(
                "primary key position {} out of range for {} fields",
                pk_position,
                schema.size()
            )));
        }
        Ok(TypeInfo {
            name,
            pk_position,
            schema,
        })
    }

    /// The primary-key attribute.
    pub fn pk_attribute(&self) -> &Attribute {
        &self.schema.attributes[self.pk_position - 1]
    }

    /// The dtype governing primary-key ordering.
    pub fn pk_dtype(&self) -> DataType {
        self.pk_attribute().dtype
    }

    /// Serialize for a catalog slot:
    /// `name pk_pos pk_name pk_type f1 t1 ... fF tF`.
    /// The primary-key name and type are stored redundantly up front so a
    /// lookup never needs the ordinal to resolve them.
    pub fn to_catalog_line(&self) -> String {
        let pk = self.pk_attribute();
        let fields = self
            .schema
            .attributes()
            .map(|a| format!("{} {}", a.name, a.dtype))
            .join(" ");
        format!(
            "{} {} {} {} {}",
            self.name, self.pk_position, pk.name, pk.dtype, fields
        )
    }

    /// Reverse of `to_catalog_line`.
    pub fn from_catalog_line(line: &str) -> Result<Self, HoradrimError> {
        trace!("parsing catalog record {:?}", line);
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 6 || tokens.len() % 2 != 0 {
            return Err(h_err(&format!("malformed catalog record {:?}", line)));
        }
        let name = tokens[0].to_string();
        let pk_position: usize = tokens[1]
            .parse()
            .map_err(|_| h_err(&format!("malformed primary key position {:?}", tokens[1])))?;
        let mut attributes = Vec::new();
        for pair in tokens[4..].chunks(2) {
            attributes.push(Attribute::new(pair[0].to_string(), pair[1].parse()?));
        }
        let info = TypeInfo::new(name, pk_position, TypeSchema::new(attributes))?;
        // The redundant pk name/type must agree with the declared list.
        let pk = info.pk_attribute();
        if pk.name != tokens[2] || pk.dtype.to_string() != tokens[3] {
            return Err(h_err(&format!(
                "catalog record {:?} disagrees on its primary key",
                line
            )));
        }
        Ok(info)
    }
}
