mod json_file_tests;
