//! Built-in templates seeded into an empty store.

use postcraft_shared::Template;

const DEFAULT_CONTENT: &str = "# {title}

## Introduction

{introduction}

## Main Content

{main_content}

## Key Points

{key_points}

## Conclusion

{conclusion}

---

*Published on {publish_date}*
*Tags: {tags}*
*Source: {source_url}*";

const TECH_TUTORIAL_CONTENT: &str = "# {title}

## Overview

{overview}

## Prerequisites

{prerequisites}

## Step-by-Step Guide

{steps}

## Code Examples

```{language}
{code_example}
```

## Troubleshooting

{troubleshooting}

## Conclusion

{conclusion}

## Resources

{resources}

---

*Difficulty: {difficulty_level}*
*Estimated time: {estimated_time}*
*Tags: {tags}*";

const NEWS_ARTICLE_CONTENT: &str = "# {title}

*{publish_date} - By {author}*

## Summary

{summary}

## Details

{main_content}

## Impact

{impact}

## What's Next

{future_implications}

## Related Links

{related_links}

---

*Source: {source_url}*
*Tags: {tags}*";

fn vars(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// The three built-in templates, all at version 1.0.0.
pub fn default_templates() -> Vec<Template> {
    vec![
        Template::new(
            "default",
            "Default Blog Template",
            "Standard blog post template with title, introduction, main content, and conclusion",
            DEFAULT_CONTENT,
            vars(&[
                "title",
                "introduction",
                "main_content",
                "key_points",
                "conclusion",
                "publish_date",
                "tags",
                "source_url",
            ]),
        ),
        Template::new(
            "tech-tutorial",
            "Technical Tutorial Template",
            "Template for technical tutorials and how-to guides",
            TECH_TUTORIAL_CONTENT,
            vars(&[
                "title",
                "overview",
                "prerequisites",
                "steps",
                "language",
                "code_example",
                "troubleshooting",
                "conclusion",
                "resources",
                "difficulty_level",
                "estimated_time",
                "tags",
            ]),
        ),
        Template::new(
            "news-article",
            "News Article Template",
            "Template for news articles and current events",
            NEWS_ARTICLE_CONTENT,
            vars(&[
                "title",
                "publish_date",
                "author",
                "summary",
                "main_content",
                "impact",
                "future_implications",
                "related_links",
                "source_url",
                "tags",
            ]),
        ),
    ]
}
