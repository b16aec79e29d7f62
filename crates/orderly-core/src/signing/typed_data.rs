//! Structured (EIP-712) messages.
//!
//! A [`StructuredMessage`] carries the domain, the type schema and the raw
//! field map. The field map is kept as JSON exactly as it will be echoed in
//! the request payload, so the server reconstructs the same struct hash from
//! the payload that the wallet signed.

use std::collections::BTreeMap;
use std::str::FromStr;

use alloy_primitives::{keccak256, Address, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::domain::DomainSeparator;
use crate::{Error, Result};

/// Name of the domain type entry in every schema.
pub const EIP712_DOMAIN_TYPE: &str = "EIP712Domain";

/// Semantic type of a message field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    /// Unsigned integer of the given bit width (8..=256).
    Uint(u16),
    Address,
}

impl FieldType {
    /// Solidity type name, as used in `encodeType`.
    pub fn type_name(&self) -> String {
        match self {
            FieldType::String => "string".to_string(),
            FieldType::Uint(bits) => format!("uint{}", bits),
            FieldType::Address => "address".to_string(),
        }
    }

    /// Encode a JSON value as a single 32-byte EIP-712 word.
    ///
    /// `uintN` accepts JSON numbers or decimal/`0x` strings.
    pub fn encode_value(&self, field: &str, value: &Value) -> Result<B256> {
        match self {
            FieldType::String => {
                let s = value
                    .as_str()
                    .ok_or_else(|| Error::invalid(field, "expected a string"))?;
                Ok(keccak256(s.as_bytes()))
            }
            FieldType::Uint(bits) => {
                let n = parse_uint(field, value)?;
                if n.bit_len() > usize::from(*bits) {
                    return Err(Error::invalid(
                        field,
                        format!("value {} does not fit in uint{}", n, bits),
                    ));
                }
                Ok(B256::from(n))
            }
            FieldType::Address => {
                let s = value
                    .as_str()
                    .ok_or_else(|| Error::invalid(field, "expected an address string"))?;
                let address = Address::from_str(s)
                    .map_err(|e| Error::invalid(field, format!("invalid address: {}", e)))?;
                Ok(B256::left_padding_from(address.as_slice()))
            }
        }
    }
}

impl FromStr for FieldType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "string" => Ok(FieldType::String),
            "address" => Ok(FieldType::Address),
            _ => {
                let bits = s
                    .strip_prefix("uint")
                    .and_then(|b| b.parse::<u16>().ok())
                    .filter(|b| *b >= 8 && *b <= 256 && b % 8 == 0)
                    .ok_or_else(|| Error::invalid("types", format!("unsupported type '{}'", s)))?;
                Ok(FieldType::Uint(bits))
            }
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.type_name())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn parse_uint(field: &str, value: &Value) -> Result<U256> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| Error::invalid(field, "expected a non-negative integer")),
        Value::String(s) => U256::from_str(s.trim())
            .map_err(|e| Error::invalid(field, format!("invalid unsigned integer: {}", e))),
        _ => Err(Error::invalid(field, "expected an unsigned integer")),
    }
}

/// A named, typed field in a struct schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
}

impl TypedField {
    pub fn new(name: &str, kind: FieldType) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

/// Type schema: struct name to ordered field list.
pub type TypeSchema = BTreeMap<String, Vec<TypedField>>;

/// Field list of the Orderly `EIP712Domain` type.
pub fn domain_fields() -> Vec<TypedField> {
    vec![
        TypedField::new("name", FieldType::String),
        TypedField::new("version", FieldType::String),
        TypedField::new("chainId", FieldType::Uint(256)),
        TypedField::new("verifyingContract", FieldType::Address),
    ]
}

/// A complete EIP-712 typed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredMessage {
    pub domain: DomainSeparator,
    pub primary_type: String,
    pub types: TypeSchema,
    pub message: Map<String, Value>,
}

impl StructuredMessage {
    /// Assemble a message, checking the schema invariants.
    ///
    /// `types` must declare `EIP712Domain` and `primary_type`; `message` must
    /// hold exactly the primary type's fields, each matching its declared type.
    #[allow(clippy::result_large_err)]
    pub fn new(
        domain: DomainSeparator,
        primary_type: &str,
        types: TypeSchema,
        message: Map<String, Value>,
    ) -> Result<Self> {
        let structured = Self {
            domain,
            primary_type: primary_type.to_string(),
            types,
            message,
        };
        structured.validate()?;
        Ok(structured)
    }

    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if !self.types.contains_key(EIP712_DOMAIN_TYPE) {
            return Err(Error::invalid("types", "missing EIP712Domain declaration"));
        }
        let fields = self.primary_fields()?;

        for field in fields {
            let value = self
                .message
                .get(&field.name)
                .ok_or_else(|| Error::invalid(field.name.clone(), "declared field missing from message"))?;
            field.kind.encode_value(&field.name, value)?;
        }

        if let Some(extra) = self
            .message
            .keys()
            .find(|key| !fields.iter().any(|f| &f.name == *key))
        {
            return Err(Error::invalid(
                extra.clone(),
                format!("field not declared for {}", self.primary_type),
            ));
        }

        Ok(())
    }

    fn primary_fields(&self) -> Result<&[TypedField]> {
        self.types
            .get(&self.primary_type)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                Error::invalid(
                    "types",
                    format!("primary type {} is not declared", self.primary_type),
                )
            })
    }

    /// `encodeType` of the primary type, e.g. `Registration(string brokerId,...)`.
    pub fn encode_type(&self) -> Result<String> {
        let fields = self
            .primary_fields()?
            .iter()
            .map(|f| format!("{} {}", f.kind.type_name(), f.name))
            .collect::<Vec<_>>()
            .join(",");
        Ok(format!("{}({})", self.primary_type, fields))
    }

    pub fn type_hash(&self) -> Result<B256> {
        Ok(keccak256(self.encode_type()?.as_bytes()))
    }

    /// Compute the EIP-712 struct hash of the message.
    pub fn struct_hash(&self) -> Result<B256> {
        let fields = self.primary_fields()?;

        let mut encoded = Vec::with_capacity(32 * (fields.len() + 1));
        encoded.extend_from_slice(self.type_hash()?.as_slice());

        for field in fields {
            let value = self.message.get(&field.name).ok_or_else(|| {
                Error::invalid(field.name.clone(), "declared field missing from message")
            })?;
            encoded.extend_from_slice(field.kind.encode_value(&field.name, value)?.as_slice());
        }

        Ok(keccak256(&encoded))
    }

    /// The digest a wallet signs: `keccak256(0x1901 ‖ domainSeparator ‖ structHash)`.
    pub fn signing_hash(&self) -> Result<B256> {
        Ok(compute_typed_data_hash(
            self.domain.separator(),
            self.struct_hash()?,
        ))
    }

    /// The value of `field` in the message, if present.
    pub fn field(&self, field: &str) -> Option<&Value> {
        self.message.get(field)
    }
}

/// Compute the EIP-712 typed data hash.
pub fn compute_typed_data_hash(domain_separator: B256, struct_hash: B256) -> B256 {
    let mut data = [0u8; 66];
    data[0] = 0x19;
    data[1] = 0x01;
    data[2..34].copy_from_slice(domain_separator.as_slice());
    data[34..66].copy_from_slice(struct_hash.as_slice());
    keccak256(data)
}
