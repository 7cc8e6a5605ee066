use chrono::Local;
use indoc::formatdoc;

/// The fixed system prompt sent on every model call. Embeds today's date and
/// the answer-formatting instructions the extractor relies on.
pub fn system_prompt() -> String {
    let today = Local::now().format("%B %d %Y");
    formatdoc! {"
        You will be asked a question by the user.
        If answering the question requires data you were not trained on, you can use the get_article tool to get the contents of a recent wikipedia article about the topic.
        If you can answer the question without needing to get more information, please do so.
        There might be questions that require you to use the tool multiple times. You can do that by calling the tool in parallel.

        Today's date is {today}
        If you think a user's question involves something in the future that hasn't happened yet, use the search tool

        When you can answer the question, keep your answer as short as possible and enclose it in <answer> tags
    "}
}
