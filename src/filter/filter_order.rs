use super::types::FilterOrderInfo;

pub struct FilterOrder;

impl FilterOrder {
    /// Render an `ORDER BY` clause over JSONB fields, appending the field names
    /// to `params`. Returns an empty string when there is nothing to order by.
    pub fn generate(order_data: &[FilterOrderInfo], params: &mut Vec<String>) -> String {
        if order_data.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = order_data
            .iter()
            .map(|info| {
                params.push(info.field.clone());
                format!("(\"data\" ->> ${}) {} NULLS LAST", params.len(), info.sort.to_sql())
            })
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}
