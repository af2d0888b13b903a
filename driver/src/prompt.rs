/// Token the prompt ends on. The model continues right after it with the query.
pub const CUE_MARKER: &str = "sql";

/// Render the sqlcoder prompt for `question` against `schema`.
///
/// Neither input is validated; rejecting empty input is up to the caller.
pub fn build_prompt(question: &str, schema: &str) -> String {
    format!(
        "### Task\n\
         Generate a SQL query to answer the following question: {question}\n\
         \n\
         ### Database Schema\n\
         The query will run on a database with the following schema:\n\
         {schema}\n\
         \n\
         ### Answer\n\
         Given the database schema, here is the SQL query that answers {question}:\n\
         {CUE_MARKER}\n"
    )
}
