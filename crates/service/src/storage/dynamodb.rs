//! DynamoDB-backed [`ItemStore`].
//!
//! Items cross the boundary as JSON: `S`, `N`, `BOOL`, `NULL`, `L` and `M`
//! attributes map onto their JSON counterparts. Binary and set attributes
//! are rejected on read.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::{error::DisplayErrorContext, types::AttributeValue, Client};
use serde_json::{Number, Value};
use tracing::debug;

use super::{Item, ItemKey, ItemStore, ScanPage};
use crate::errors::StoreError;

type Attributes = HashMap<String, AttributeValue>;

#[derive(Clone)]
pub struct DynamoItemStore {
    client: Client,
    table: String,
    key_attribute: String,
}

impl DynamoItemStore {
    pub fn new(client: Client, table: impl Into<String>, key_attribute: impl Into<String>) -> Self {
        Self { client, table: table.into(), key_attribute: key_attribute.into() }
    }

    /// Build a client from the ambient AWS configuration (env, profile, IMDS).
    pub async fn from_env(table: impl Into<String>, key_attribute: impl Into<String>) -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&sdk_config), table, key_attribute)
    }

    fn key_attributes(key: &ItemKey) -> Attributes {
        HashMap::from([(key.name.clone(), AttributeValue::S(key.value.clone()))])
    }
}

fn backend<E>(err: E) -> StoreError
where
    E: std::error::Error,
{
    StoreError::Backend(DisplayErrorContext(&err).to_string())
}

#[async_trait]
impl ItemStore for DynamoItemStore {
    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .set_key(Some(Self::key_attributes(key)))
            .send()
            .await
            .map_err(backend)?;
        output.item().map(item_from_attributes).transpose()
    }

    async fn scan(&self, start: Option<ItemKey>, limit: usize) -> Result<ScanPage, StoreError> {
        let output = self
            .client
            .scan()
            .table_name(&self.table)
            .limit(i32::try_from(limit.max(1)).unwrap_or(i32::MAX))
            .set_exclusive_start_key(start.as_ref().map(Self::key_attributes))
            .send()
            .await
            .map_err(backend)?;

        let items = output.items().iter().map(item_from_attributes).collect::<Result<Vec<_>, _>>()?;
        let last_key = output
            .last_evaluated_key()
            .and_then(|k| k.get(&self.key_attribute))
            .and_then(|v| v.as_s().ok())
            .map(|v| ItemKey::new(self.key_attribute.clone(), v.clone()));
        debug!(table = %self.table, count = items.len(), more = last_key.is_some(), "dynamodb scan page");
        Ok(ScanPage { items, last_key })
    }

    async fn put_item(&self, item: Item) -> Result<(), StoreError> {
        if ItemKey::of(&item, &self.key_attribute).is_none() {
            return Err(StoreError::InvalidKey(format!("item has no string attribute `{}`", self.key_attribute)));
        }
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item_to_attributes(item)))
            .send()
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn delete_item(&self, key: &ItemKey) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .set_key(Some(Self::key_attributes(key)))
            .send()
            .await
            .map_err(backend)?;
        Ok(())
    }
}

pub(crate) fn item_from_attributes(attrs: &Attributes) -> Result<Item, StoreError> {
    attrs
        .iter()
        .map(|(name, value)| Ok((name.clone(), value_from_attribute(value)?)))
        .collect()
}

fn value_from_attribute(value: &AttributeValue) -> Result<Value, StoreError> {
    Ok(match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => Value::Number(
            serde_json::from_str::<Number>(n).map_err(|e| StoreError::Decode(format!("number `{n}`: {e}")))?,
        ),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(list) => Value::Array(list.iter().map(value_from_attribute).collect::<Result<_, _>>()?),
        AttributeValue::M(map) => Value::Object(item_from_attributes(map)?),
        other => return Err(StoreError::Decode(format!("unsupported attribute type: {other:?}"))),
    })
}

pub(crate) fn item_to_attributes(item: Item) -> Attributes {
    item.into_iter().map(|(name, value)| (name, value_to_attribute(value))).collect()
}

fn value_to_attribute(value: Value) -> AttributeValue {
    match value {
        Value::String(s) => AttributeValue::S(s),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Null => AttributeValue::Null(true),
        Value::Array(list) => AttributeValue::L(list.into_iter().map(value_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(item_to_attributes(map)),
    }
}
