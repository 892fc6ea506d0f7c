/// English stop-words dropped before tag scoring. Sorted for binary search.
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "be", "became", "because", "become", "becomes", "been", "before",
    "behind", "being", "below", "beside", "besides", "between", "beyond", "both", "but", "by",
    "can", "cannot", "could", "did", "do", "does", "doing", "done", "down", "due", "during",
    "each", "either", "else", "elsewhere", "enough", "etc", "even", "ever", "every", "everyone",
    "everything", "everywhere", "except", "few", "for", "from", "further", "get", "give", "had",
    "has", "have", "he", "hence", "her", "here", "hers", "herself", "him", "himself", "his",
    "how", "however", "i", "ie", "if", "in", "into", "is", "it", "its", "itself", "just",
    "latest", "latter", "least", "less", "made", "many", "may", "me", "meanwhile", "might", "more",
    "moreover", "most", "mostly", "much", "must", "my", "myself", "neither", "never",
    "nevertheless", "new", "next", "no", "nobody", "none", "nor", "not", "nothing", "now", "nowhere",
    "of", "off", "often", "on", "once", "one", "only", "onto", "or", "other", "others",
    "otherwise", "our", "ours", "ourselves", "out", "over", "own", "per", "perhaps", "please",
    "put", "rather", "re", "same", "see", "seem", "seemed", "seems", "several", "she", "should",
    "show", "since", "so", "some", "somehow", "someone", "something", "sometime", "sometimes",
    "somewhere", "still", "such", "than", "that", "the", "their", "them", "themselves", "then",
    "there", "thereafter", "thereby", "therefore", "these", "they", "this", "those", "though",
    "through", "throughout", "thus", "to", "together", "too", "toward", "towards", "under",
    "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were", "what", "whatever",
    "when", "whence", "whenever", "where", "whereas", "whether", "which", "while", "who",
    "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without", "would",
    "yet", "you", "your", "yours", "yourself", "yourselves",
];

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}
