mod gateway_adapter_tests;
