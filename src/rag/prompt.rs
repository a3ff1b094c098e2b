use super::query::Query;

pub const FALLBACK_ANSWER: &str = "Sorry, I don't know how to help with that.";

/// Fixed instructions wrapped around the retrieved context and the question.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    product_name: String,
}

impl PromptTemplate {
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
        }
    }

    pub fn preamble(&self) -> String {
        let product = &self.product_name;
        format!(
            "You are a very enthusiastic {product} representative who loves to help people! \
             Given the following sections from the {product} documentation, answer the question \
             using only that information, outputted in markdown format. If you are unsure and \
             the answer is not explicitly written in the documentation, say \"{FALLBACK_ANSWER}\""
        )
    }

    pub fn render(&self, context: &str, query: &Query) -> String {
        format!(
            "{preamble}\n\n\
             Context sections:\n\
             {context}\n\n\
             Question: \"\"\"\n\
             {question}\n\
             \"\"\"\n\n\
             Answer as markdown (including related code snippets if available):",
            preamble = self.preamble(),
            question = query.as_str(),
        )
    }
}
