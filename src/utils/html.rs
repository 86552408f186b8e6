use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Exam descriptions and question/item prompts are entered by
/// administrators as rich text; this strips dangerous tags (like <script>,
/// <iframe>) and attributes (like onclick) while preserving safe markup,
/// so stored content is safe to render in any client.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
