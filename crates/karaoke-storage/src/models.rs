use crate::schema::kv_entries;

use diesel::prelude::*;

#[derive(Debug, Queryable)]
#[diesel(table_name = kv_entries)]
pub struct KvRow {
  pub entry_key: String,
  pub entry_value: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = kv_entries)]
pub struct NewKvRow<'a> {
  pub entry_key: &'a str,
  pub entry_value: &'a str,
}
