// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use super::CatalogTable;

pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format(table: &CatalogTable) -> String {
        let rows = table.to_json_rows();
        serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
    }
}
