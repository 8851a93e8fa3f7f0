// src/models/data_br.rs
//! Datas no formato brasileiro `DD/MM/AAAA`, como a API as recebe e devolve.
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

pub const FORMATO: &str = "%d/%m/%Y";

pub fn parse(texto: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(texto.trim(), FORMATO)
        .map_err(|_| format!("Formato de data inválido ('{}'). Use DD/MM/AAAA", texto))
}

pub fn formatar(data: &NaiveDate) -> String {
    data.format(FORMATO).to_string()
}

/// Para campos `Option<NaiveDate>`. Ausente, `null` ou `""` viram `None`.
pub mod opcional {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S: Serializer>(data: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match data {
            Some(d) => s.serialize_str(&formatar(d)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(texto) if !texto.trim().is_empty() => parse(&texto).map(Some).map_err(D::Error::custom),
            _ => Ok(None),
        }
    }
}
