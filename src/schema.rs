diesel::table! {
    sentence_bank (id) {
        id -> Text,
        owner -> Nullable<Text>,
        original -> Text,
        skeleton -> Text,
        char_length -> Integer,
        token_length -> Integer,
        clause_count -> Integer,
        clause_order -> Text,
        punctuation_pattern -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    batch_jobs (id) {
        id -> Text,
        kind -> Text,
        status -> Text,
        owner -> Nullable<Text>,
        transform_level -> Text,
        total_sections -> Integer,
        completed_sections -> Integer,
        failed_sections -> Integer,
        current_section_index -> Integer,
        next_process_time -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    batch_sections (id) {
        id -> Text,
        job_id -> Text,
        section_index -> Integer,
        input_text -> Text,
        output_text -> Nullable<Text>,
        status -> Text,
        word_count -> Integer,
        sentence_count -> Integer,
        error_message -> Nullable<Text>,
        processed_at -> Nullable<Text>,
    }
}

diesel::joinable!(batch_sections -> batch_jobs (job_id));

diesel::allow_tables_to_appear_in_same_query!(batch_jobs, batch_sections, sentence_bank);
