//! Prompt construction for chunk, style and whole-book extraction

use folio_domain::Chunk;

/// Where a chunk sits in the manuscript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkPosition {
    /// First chunk
    Beginning,
    /// Neither first nor last
    Middle,
    /// Last chunk of several
    End,
}

impl ChunkPosition {
    /// Position of the chunk at `index` out of `total`
    pub fn of(index: usize, is_first: bool, total: usize) -> Self {
        if is_first {
            ChunkPosition::Beginning
        } else if index + 1 >= total {
            ChunkPosition::End
        } else {
            ChunkPosition::Middle
        }
    }
}

/// Builds prompts in the manuscript's language
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    language: String,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    /// System instruction for chunk extraction
    pub fn chunk_system(&self) -> String {
        format!(
            "You are a book analysis expert for {} literature. Extract structural \
             information quickly and accurately. Return ONLY valid JSON.",
            self.language
        )
    }

    /// System instruction for style analysis
    pub fn style_system(&self) -> String {
        format!(
            "You are a literary style analyst for {} fiction. Return ONLY valid JSON.",
            self.language
        )
    }

    /// System instruction for whole-book extraction
    pub fn direct_system(&self) -> String {
        format!(
            "You are a book analysis expert for {} literature. Read the complete \
             book carefully and return ONLY valid JSON.",
            self.language
        )
    }

    /// Extraction prompt for one chunk
    pub fn chunk(&self, chunk: &Chunk, position: ChunkPosition, total: usize) -> String {
        let part = chunk.index + 1;
        let position_note = match position {
            ChunkPosition::Beginning => "This is the BEGINNING of the book.".to_string(),
            ChunkPosition::Middle => format!("This is a MIDDLE section (part {}).", part),
            ChunkPosition::End => format!("This is the FINAL section of the book (part {}).", part),
        };

        let mut prompt = String::new();
        prompt.push_str(&format!(
            "You are analyzing part {} of {} of a {} book.\n\n",
            part, total, self.language
        ));
        prompt.push_str("TASK: Extract chapters, characters, and locations from this text segment.\n\n");
        prompt.push_str(&position_note);
        prompt.push_str("\n\nTEXT SEGMENT:\n");
        prompt.push_str(&chunk.content);
        prompt.push_str("\n\n");
        prompt.push_str(&self.book_format(false));
        prompt.push_str(&format!(
            "\n\nIMPORTANT:\n\
             - Include ALL text from this segment in chapters - don't skip content\n\
             - If no clear chapter breaks exist, treat the whole segment as one chapter\n\
             - Extract ALL character and location names you find\n\
             - All descriptions in {}",
            self.language
        ));
        prompt
    }

    /// Style prompt over the joined samples
    pub fn style(&self, sample: &str) -> String {
        format!(
            "Analyze the writing style of this {} text sample:\n\n\
             TEXT SAMPLE:\n{}\n\n\
             OUTPUT FORMAT - Return ONLY valid JSON:\n{}",
            self.language,
            sample,
            self.style_format()
        )
    }

    /// Single-shot prompt over the whole text
    pub fn direct(&self, text: &str) -> String {
        format!(
            "Analyze this complete {language} book. Split it into its chapters, and \
             extract every character and location.\n\n\
             BOOK TEXT:\n{text}\n\n{format}\n\n\
             IMPORTANT:\n\
             - Include ALL text of the book in chapters - don't skip content\n\
             - Use the book's own chapter titles when present\n\
             - All descriptions in {language}",
            language = self.language,
            text = text,
            format = self.book_format(true),
        )
    }

    fn style_format(&self) -> String {
        format!(
            "{{\n  \"tone\": \"<description of emotional tone in {lang}>\",\n  \
             \"pov\": \"first|third-limited|third-omniscient\",\n  \
             \"tense\": \"past|present\",\n  \
             \"descriptionDensity\": \"sparse|moderate|rich\",\n  \
             \"dialogueStyle\": \"<description of dialogue style in {lang}>\"\n}}",
            lang = self.language
        )
    }

    fn book_format(&self, with_style: bool) -> String {
        let lang = &self.language;
        let mut format = String::from("OUTPUT FORMAT - Return ONLY valid JSON:\n{\n");
        format.push_str(&format!(
            "  \"chapters\": [\n    {{\n      \"chapterNumber\": <number>,\n      \
             \"title\": \"<chapter title if found, or a descriptive title in {lang}>\",\n      \
             \"content\": \"<full chapter text>\",\n      \
             \"summary\": \"<brief summary in {lang}>\"\n    }}\n  ],\n"
        ));
        format.push_str(&format!(
            "  \"characters\": [\n    {{\n      \"name\": \"<character name>\",\n      \
             \"description\": \"<brief description in {lang}>\",\n      \
             \"traits\": [\"trait1\", \"trait2\"]\n    }}\n  ],\n"
        ));
        format.push_str(&format!(
            "  \"locations\": [\n    {{\n      \"name\": \"<location name>\",\n      \
             \"description\": \"<description in {lang}>\",\n      \
             \"type\": \"city|village|building|nature|other\"\n    }}\n  ]"
        ));
        if with_style {
            format.push_str(",\n  \"styleAnalysis\": ");
            format.push_str(&self.style_format().replace('\n', "\n  "));
        }
        format.push_str("\n}");
        format
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new("Bulgarian")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(index: usize, content: &str) -> Chunk {
        Chunk {
            index,
            content: content.to_string(),
            start_offset: 0,
            end_offset: content.len(),
            estimated_token_count: 1,
        }
    }

    #[test]
    fn test_position_of_chunk() {
        assert_eq!(ChunkPosition::of(0, true, 3), ChunkPosition::Beginning);
        assert_eq!(ChunkPosition::of(1, false, 3), ChunkPosition::Middle);
        assert_eq!(ChunkPosition::of(2, false, 3), ChunkPosition::End);
        assert_eq!(ChunkPosition::of(0, true, 1), ChunkPosition::Beginning);
    }

    #[test]
    fn test_chunk_prompt_includes_text_and_position() {
        let builder = PromptBuilder::default();
        let prompt = builder.chunk(&chunk(1, "Иван тръгна към селото."), ChunkPosition::Middle, 4);

        assert!(prompt.contains("part 2 of 4"));
        assert!(prompt.contains("MIDDLE section (part 2)"));
        assert!(prompt.contains("Иван тръгна към селото."));
        assert!(prompt.contains("\"chapters\""));
        assert!(prompt.contains("\"locations\""));
        assert!(!prompt.contains("styleAnalysis"));
    }

    #[test]
    fn test_beginning_and_end_notes() {
        let builder = PromptBuilder::default();
        let first = builder.chunk(&chunk(0, "a"), ChunkPosition::Beginning, 2);
        let last = builder.chunk(&chunk(1, "b"), ChunkPosition::End, 2);

        assert!(first.contains("BEGINNING of the book"));
        assert!(last.contains("FINAL section"));
    }

    #[test]
    fn test_language_is_configurable() {
        let builder = PromptBuilder::new("English");
        let prompt = builder.chunk(&chunk(0, "text"), ChunkPosition::Beginning, 1);

        assert!(prompt.contains("of a English book"));
        assert!(prompt.contains("All descriptions in English"));
        assert!(builder.chunk_system().contains("English literature"));
    }

    #[test]
    fn test_style_prompt_lists_fields() {
        let prompt = PromptBuilder::default().style("sample text");

        assert!(prompt.contains("writing style"));
        assert!(prompt.contains("sample text"));
        for field in ["tone", "pov", "tense", "descriptionDensity", "dialogueStyle"] {
            assert!(prompt.contains(field), "missing {}", field);
        }
    }

    #[test]
    fn test_direct_prompt_requests_style() {
        let prompt = PromptBuilder::default().direct("whole book");

        assert!(prompt.contains("complete Bulgarian book"));
        assert!(prompt.contains("whole book"));
        assert!(prompt.contains("\"styleAnalysis\""));
        assert!(prompt.contains("\"characters\""));
    }
}
