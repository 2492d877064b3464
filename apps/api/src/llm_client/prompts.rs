// Shared prompt fragments.
// Each flow defines its own templates in flows/prompts.rs; this file holds
// the cross-cutting pieces they all reuse.

/// Appended to every extraction prompt.
pub const EXTRACTION_INSTRUCTION: &str = "\
    Only extract information that is explicitly present in the document. \
    If a field cannot be determined, use an empty string, an empty list, or null as the schema allows. \
    Never invent employers, dates, degrees, or salary figures.";

/// Appended to the matching prompts.
pub const MATCHING_INSTRUCTION: &str = "\
    Only return ids that appear in the provided list. \
    Order ids from strongest to weakest match. \
    Return an empty list if nothing is a reasonable match.";
